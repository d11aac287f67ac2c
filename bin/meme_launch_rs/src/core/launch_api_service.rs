use std::{path::Path, time::Duration};

use async_trait::async_trait;
use ethers::{
    signers::{LocalWallet, Signer},
    types::Address,
};
use meme_launch_utils::{
    constants::{MAX_IMAGE_SIZE_BYTES, SUPPORTED_IMAGE_EXTENSIONS},
    utils::{format_lower_hex, format_signature, sign_text},
};
use reqwest::{
    multipart::{Form, Part},
    Client, Response,
};
use serde::Serialize;
use url::Url;

use crate::{
    constants::{Env, API_MAX_ATTEMPTS, API_REQUEST_TIMEOUT, API_RETRY_DELAY},
    types::{
        login_message, ApiEnvelope, ApiError, CreateTokenBody, CreationAuthorization,
        LoginRequestBody, NonceRequestBody, SessionToken, TokenCreationRequest,
        VERIFY_TYPE_LOGIN,
    },
};

const NONCE_PATH: &str = "v1/private/user/nonce/generate";
const LOGIN_PATH: &str = "v1/private/user/login/dex";
const UPLOAD_PATH: &str = "v1/private/token/upload";
const CREATE_PATH: &str = "v1/private/token/create";
const ACCESS_HEADER: &str = "meme-web-access";

/// Image bytes ready for the multipart upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_path(path: &Path) -> Result<Self, ApiError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| ApiError::Upload(format!("{:?} is not a file", path)))?;
        if image_mime_type(&file_name).is_none() {
            return Err(ApiError::Upload(format!(
                "{} has an unsupported format, expected one of {:?}",
                file_name, SUPPORTED_IMAGE_EXTENSIONS
            )));
        }
        let read_err =
            |err: std::io::Error| ApiError::Upload(format!("cannot read {:?}: {}", path, err));
        let size = std::fs::metadata(path).map_err(read_err)?.len();
        if size > MAX_IMAGE_SIZE_BYTES {
            return Err(ApiError::Upload(format!(
                "{} is {} bytes, limit is {}",
                file_name, size, MAX_IMAGE_SIZE_BYTES
            )));
        }
        let bytes = std::fs::read(path).map_err(read_err)?;
        Ok(Self { file_name, bytes })
    }
}

pub fn image_mime_type(file_name: &str) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    match extension.as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "bmp" => Some("image/bmp"),
        "webp" => Some("image/webp"),
        _ => None,
    }
}

/// Operations the workflow needs from the launch platform API.
#[async_trait]
pub trait LaunchApi: Send + Sync {
    async fn request_challenge(&self, address: Address) -> Result<String, ApiError>;

    async fn login(&self, address: Address, signature: &str) -> Result<SessionToken, ApiError>;

    async fn upload_image(
        &self,
        session: &SessionToken,
        image: ImageUpload,
    ) -> Result<String, ApiError>;

    async fn request_token_creation(
        &self,
        session: &SessionToken,
        request: &TokenCreationRequest,
    ) -> Result<CreationAuthorization, ApiError>;

    /// Challenge, sign, login.
    async fn authenticate(&self, wallet: &LocalWallet) -> Result<SessionToken, ApiError> {
        let address = wallet.address();
        let nonce = self.request_challenge(address).await?;
        let signature = sign_text(wallet, &login_message(&nonce))
            .await
            .map_err(|err| ApiError::Auth(err.to_string()))?;
        self.login(address, &format_signature(&signature)).await
    }
}

#[derive(Debug, Clone)]
pub struct LaunchApiService {
    client: Client,
    base_url: String,
    network_code: String,
    max_attempts: u32,
    retry_delay: Duration,
}

impl LaunchApiService {
    pub fn new(base_url: &str, network_code: &str) -> Result<Self, ApiError> {
        // validated once here so endpoint() can only fail on a bad path
        Url::parse(base_url)?;
        let client = Client::builder()
            .timeout(API_REQUEST_TIMEOUT)
            .user_agent(concat!("meme_launch_rs/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            network_code: network_code.to_string(),
            max_attempts: API_MAX_ATTEMPTS,
            retry_delay: API_RETRY_DELAY,
        })
    }

    pub fn from_env(env: &Env) -> Result<Self, ApiError> {
        Self::new(&env.api_base_url, &env.api_network_code)
    }

    pub fn with_retry_policy(mut self, max_attempts: u32, retry_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.retry_delay = retry_delay;
        self
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}/{}", self.base_url, path))?)
    }

    async fn read_envelope(response: Response) -> Result<(ApiEnvelope, String), ApiError> {
        if let Err(err) = response.error_for_status_ref() {
            if response.status().is_server_error() {
                return Err(ApiError::Request(err));
            }
        }
        let text = response.text().await?;
        let envelope: ApiEnvelope = serde_json::from_str(&text)
            .map_err(|err| ApiError::ResponseSerdeJson { err, text: text.clone() })?;
        Ok((envelope, text))
    }

    async fn send_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        session: Option<&SessionToken>,
    ) -> Result<Response, ApiError> {
        let mut request = self.client.post(self.endpoint(path)?).json(body);
        if let Some(session) = session {
            request = request.header(ACCESS_HEADER, session.as_str());
        }
        Ok(request.send().await?)
    }

    async fn post_json<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
        session: Option<&SessionToken>,
    ) -> Result<(ApiEnvelope, String), ApiError> {
        let response = self.send_json(path, body, session).await?;
        Self::read_envelope(response).await
    }
}

#[async_trait]
impl LaunchApi for LaunchApiService {
    async fn request_challenge(&self, address: Address) -> Result<String, ApiError> {
        let body = NonceRequestBody {
            account_address: format_lower_hex(&address),
            verify_type: VERIFY_TYPE_LOGIN.to_string(),
            network_code: self.network_code.clone(),
        };

        // no side effects, safe to retry
        let mut attempt = 1;
        let (envelope, text) = loop {
            match self.post_json(NONCE_PATH, &body, None).await {
                Ok(response) => break response,
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    log::warn!(
                        "[LaunchApiService] nonce attempt {}/{} failed: {}",
                        attempt,
                        self.max_attempts,
                        err
                    );
                    attempt += 1;
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(err) => return Err(err),
            }
        };

        if !envelope.is_success() {
            return Err(ApiError::Api {
                code: envelope.code_str(),
                message: envelope.message(),
            });
        }
        envelope
            .data_str()
            .ok_or_else(|| ApiError::UnexpectedShape(format!("nonce missing in {}", text)))
    }

    async fn login(&self, address: Address, signature: &str) -> Result<SessionToken, ApiError> {
        let body = LoginRequestBody::new(
            format_lower_hex(&address),
            self.network_code.clone(),
            signature.to_string(),
        );
        let (envelope, text) = self.post_json(LOGIN_PATH, &body, None).await?;
        if !envelope.is_success() {
            return Err(ApiError::Auth(format!(
                "code {}: {}",
                envelope.code_str(),
                envelope.message()
            )));
        }
        let token = envelope
            .data_str()
            .ok_or_else(|| ApiError::Auth(format!("session token missing in {}", text)))?;
        log::info!("[LaunchApiService] logged in {:#x}", address);
        Ok(SessionToken::new(token))
    }

    async fn upload_image(
        &self,
        session: &SessionToken,
        image: ImageUpload,
    ) -> Result<String, ApiError> {
        let mime = image_mime_type(&image.file_name)
            .ok_or_else(|| ApiError::Upload(format!("unsupported format {}", image.file_name)))?;
        let file_name = image.file_name.clone();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(mime)?;
        // multipart sets its own content type with the boundary
        let response = self
            .client
            .post(self.endpoint(UPLOAD_PATH)?)
            .header(ACCESS_HEADER, session.as_str())
            .multipart(Form::new().part("file", part))
            .send()
            .await?;
        let (envelope, text) = Self::read_envelope(response).await?;
        if !envelope.is_success() {
            return Err(ApiError::Upload(format!(
                "code {}: {}",
                envelope.code_str(),
                envelope.message()
            )));
        }
        let image_url = envelope
            .data_str()
            .ok_or_else(|| ApiError::Upload(format!("image url missing in {}", text)))?;
        log::info!("[LaunchApiService] uploaded {} -> {}", file_name, image_url);
        Ok(image_url)
    }

    async fn request_token_creation(
        &self,
        session: &SessionToken,
        request: &TokenCreationRequest,
    ) -> Result<CreationAuthorization, ApiError> {
        let body = CreateTokenBody::new(
            request,
            &self.network_code,
            chrono::Utc::now().timestamp_millis(),
        );
        // raw body is logged before any status or code check
        let response = self.send_json(CREATE_PATH, &body, Some(session)).await?;
        let status = response.status();
        let text = response.text().await?;
        log::info!("[LaunchApiService] create response {} {}", status, text);

        if !status.is_success() {
            return Err(ApiError::CreationRequest {
                message: format!("http status {}", status),
                raw: text,
            });
        }
        let envelope: ApiEnvelope = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(err) => {
                return Err(ApiError::CreationRequest {
                    message: format!("malformed response: {}", err),
                    raw: text,
                })
            }
        };
        if !envelope.is_success() {
            return Err(ApiError::CreationRequest {
                message: format!("code {}: {}", envelope.code_str(), envelope.message()),
                raw: text,
            });
        }
        serde_json::from_value(envelope.data.clone()).map_err(|err| ApiError::CreationRequest {
            message: format!("unexpected creation data: {}", err),
            raw: text,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use meme_launch_utils::utils::load_private_key_wallet;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, header_regex, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::types::TokenLabel;

    const FIXTURE_KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";

    fn service(server: &MockServer) -> LaunchApiService {
        LaunchApiService::new(&format!("{}/meme-api", server.uri()), "BSC")
            .unwrap()
            .with_retry_policy(3, Duration::from_millis(10))
    }

    fn address() -> Address {
        Address::from_str("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
    }

    fn token_request() -> TokenCreationRequest {
        TokenCreationRequest {
            name: "Moon Token".to_string(),
            symbol: "MOON42".to_string(),
            description: "To the moon".to_string(),
            label: TokenLabel::Meme,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn challenge_returns_nonce() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .and(body_partial_json(json!({
                "accountAddress": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
                "verifyType": "LOGIN",
                "networkCode": "BSC"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": "918273"})))
            .expect(1)
            .mount(&server)
            .await;

        let nonce = service(&server).request_challenge(address()).await.unwrap();
        assert_eq!(nonce, "918273");
    }

    #[tokio::test]
    async fn challenge_error_code_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": "1003", "msg": "rate limited"})),
            )
            .mount(&server)
            .await;

        let err = service(&server)
            .request_challenge(address())
            .await
            .unwrap_err();
        match err {
            ApiError::Api { code, message } => {
                assert_eq!(code, "1003");
                assert_eq!(message, "rate limited");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn challenge_retries_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": "0", "data": "42"})))
            .expect(1)
            .mount(&server)
            .await;

        let nonce = service(&server).request_challenge(address()).await.unwrap();
        assert_eq!(nonce, "42");
    }

    #[tokio::test]
    async fn challenge_gives_up_after_max_attempts() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .respond_with(ResponseTemplate::new(502))
            .expect(3)
            .mount(&server)
            .await;

        let err = service(&server)
            .request_challenge(address())
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn login_is_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/login/dex"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let result = service(&server).login(address(), "0xabc").await;
        assert!(matches!(result, Err(ApiError::Request(_))));
    }

    #[tokio::test]
    async fn login_rejection_is_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/login/dex"))
            .and(body_partial_json(json!({
                "region": "WEB",
                "walletName": "MetaMask",
                "verifyInfo": {"signature": "0xabc", "verifyType": "LOGIN", "networkCode": "BSC"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": 2001, "msg": "bad signature"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let result = service(&server).login(address(), "0xabc").await;
        assert!(matches!(result, Err(ApiError::Auth(message)) if message.contains("bad signature")));
    }

    #[tokio::test]
    async fn authenticate_signs_challenge_and_logs_in() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/nonce/generate"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": "777"})))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/login/dex"))
            .and(body_partial_json(json!({
                "verifyInfo": {"address": "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"}
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"code": 0, "data": "session-1"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let wallet = load_private_key_wallet(FIXTURE_KEY).unwrap();
        let session = service(&server).authenticate(&wallet).await.unwrap();
        assert_eq!(session.as_str(), "session-1");
    }

    #[tokio::test]
    async fn upload_sends_multipart_with_session_header() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/token/upload"))
            .and(header(ACCESS_HEADER, "session-1"))
            .and(header_regex("content-type", "^multipart/form-data; boundary="))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                json!({"code": 0, "data": "https://static.four.meme/market/moon.png"}),
            ))
            .expect(1)
            .mount(&server)
            .await;

        let image = ImageUpload {
            file_name: "moon.png".to_string(),
            bytes: vec![0x89, 0x50, 0x4e, 0x47],
        };
        let url = service(&server)
            .upload_image(&SessionToken::new("session-1"), image)
            .await
            .unwrap();
        assert_eq!(url, "https://static.four.meme/market/moon.png");
    }

    #[test]
    fn rejects_unreadable_or_unsupported_images() {
        assert!(matches!(
            ImageUpload::from_path(Path::new("/definitely/missing/moon.png")),
            Err(ApiError::Upload(_))
        ));
        assert!(matches!(
            ImageUpload::from_path(Path::new("/definitely/missing/moon.svg")),
            Err(ApiError::Upload(_))
        ));
        assert_eq!(image_mime_type("MOON.JPG"), Some("image/jpeg"));
        assert_eq!(image_mime_type("moon.tiff"), None);
    }

    #[tokio::test]
    async fn creation_returns_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/token/create"))
            .and(header(ACCESS_HEADER, "session-1"))
            .and(body_partial_json(json!({
                "name": "Moon Token",
                "shortName": "MOON42",
                "totalSupply": 1_000_000_000u64,
                "raisedToken": {"symbol": "BNB", "networkCode": "BSC"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "code": "0",
                "data": {"createArg": "0x0a0b", "signature": "0x0c0d"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let authorization = service(&server)
            .request_token_creation(&SessionToken::new("session-1"), &token_request())
            .await
            .unwrap();
        assert_eq!(authorization.create_arg.to_vec(), vec![0x0a, 0x0b]);
        assert_eq!(authorization.signature.to_vec(), vec![0x0c, 0x0d]);
    }

    #[tokio::test]
    async fn creation_rejection_keeps_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/token/create"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 5005, "msg": "symbol already used"})),
            )
            .mount(&server)
            .await;

        let err = service(&server)
            .request_token_creation(&SessionToken::new("session-1"), &token_request())
            .await
            .unwrap_err();
        match err {
            ApiError::CreationRequest { message, raw } => {
                assert!(message.contains("5005"));
                assert!(raw.contains("symbol already used"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn creation_with_unexpected_data_fails_closed() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/token/create"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"code": 0, "data": {"createArg": "0x01"}})),
            )
            .mount(&server)
            .await;

        let result = service(&server)
            .request_token_creation(&SessionToken::new("session-1"), &token_request())
            .await;
        assert!(matches!(result, Err(ApiError::CreationRequest { .. })));
    }

    #[tokio::test]
    async fn creation_server_error_keeps_raw_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/token/create"))
            .respond_with(ResponseTemplate::new(502).set_body_string("upstream signer down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = service(&server)
            .request_token_creation(&SessionToken::new("session-1"), &token_request())
            .await
            .unwrap_err();
        match err {
            ApiError::CreationRequest { message, raw } => {
                assert!(message.contains("502"));
                assert_eq!(raw, "upstream signer down");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn oversized_image_is_rejected_before_reading() {
        let path = std::env::temp_dir().join(format!("meme_launch_big_{}.png", std::process::id()));
        let file = std::fs::File::create(&path).unwrap();
        // sparse file, only the length is set
        file.set_len(MAX_IMAGE_SIZE_BYTES + 1).unwrap();

        let result = ImageUpload::from_path(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(ApiError::Upload(message)) if message.contains("limit")));
    }

    #[tokio::test]
    async fn non_json_body_is_deserialization_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/meme-api/v1/private/user/login/dex"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
            .mount(&server)
            .await;

        let result = service(&server).login(address(), "0xabc").await;
        assert!(
            matches!(result, Err(ApiError::ResponseSerdeJson { text, .. }) if text.contains("maintenance"))
        );
    }
}
