use ethers::contract::abigen;

abigen!(
    TokenManager2Abigen,
    r#"[
        function createToken(bytes args, bytes signature) external payable
        function buyTokenAMAP(address token, uint256 funds, uint256 minAmount) external payable
        function sellToken(address token, uint256 amount) external
        function STATUS_ADDING_LIQUIDITY() external view returns (uint256)
        function STATUS_COMPLETED() external view returns (uint256)
        function STATUS_HALT() external view returns (uint256)
        function STATUS_TRADING() external view returns (uint256)
        event TokenCreate(address creator, address token, uint256 requestId, string name, string symbol, uint256 totalSupply, uint256 launchTime, uint256 launchFee)
    ]"#
);

abigen!(
    Erc20Abigen,
    r#"[
        function name() external view returns (string)
        function symbol() external view returns (string)
        function decimals() external view returns (uint8)
        function balanceOf(address owner) external view returns (uint256)
        function allowance(address owner, address spender) external view returns (uint256)
        function approve(address spender, uint256 amount) external returns (bool)
        function transfer(address to, uint256 amount) external returns (bool)
    ]"#
);

/// `_tokenInfos` returns a 13-word tuple; only a few fields are consumed,
/// so it is decoded by hand instead of through a generated binding.
pub const TOKEN_INFOS_SIGNATURE: &str = "function _tokenInfos(address token) external view returns (address base, address quote, uint256 template, uint256 totalSupply, uint256 maxOffers, uint256 maxRaising, uint256 launchTime, uint256 offers, uint256 funds, uint256 lastPrice, uint256 K, uint256 T, uint256 status)";
pub const TOKEN_INFOS_STATUS_INDEX: usize = 12;
