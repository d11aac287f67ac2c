use rand::{seq::SliceRandom, Rng};
use rust_decimal::Decimal;

use crate::types::{TokenCreationRequest, TokenLabel};

const BASE_NAMES: [&str; 64] = [
    "Moon", "Rocket", "Diamond", "Golden", "Cyber", "Quantum", "Stellar", "Phoenix", "Thunder",
    "Lightning", "Fire", "Ice", "Storm", "Wind", "Earth", "Ocean", "Alpha", "Beta", "Gamma",
    "Delta", "Omega", "Prime", "Ultra", "Super", "Mega", "Giga", "Tera", "Nova", "Apex", "Elite",
    "Pro", "Max", "King", "Queen", "Lord", "Master", "Champion", "Legend", "Hero", "Warrior",
    "Dragon", "Tiger", "Lion", "Eagle", "Wolf", "Bear", "Shark", "Falcon", "Crypto", "Block",
    "Chain", "Hash", "Node", "Mint", "Stake", "Yield", "DeFi", "NFT", "Meta", "Web3", "DAO",
    "DEX", "AMM", "LP",
];

const SUFFIXES: [&str; 15] = [
    "Token", "Coin", "Finance", "Protocol", "Network", "Chain", "Swap", "DAO", "AI", "Bot", "Lab",
    "Tech", "Verse", "World", "Land",
];

const DOMAINS: [&str; 15] = [
    "finance", "protocol", "network", "chain", "swap", "defi", "crypto", "token", "coin", "dao",
    "tech", "lab", "verse", "world", "app",
];

const LABELS: [TokenLabel; 6] = [
    TokenLabel::Ai,
    TokenLabel::Meme,
    TokenLabel::Defi,
    TokenLabel::Games,
    TokenLabel::Social,
    TokenLabel::Others,
];

/// Random but plausible token metadata for unattended batch launches.
#[derive(Debug, Clone, Default)]
pub struct TokenMetadataGenerator;

impl TokenMetadataGenerator {
    pub fn generate<R: Rng + ?Sized>(&self, rng: &mut R) -> TokenCreationRequest {
        let base_name = *BASE_NAMES.choose(rng).unwrap_or(&"Moon");
        let suffix = *SUFFIXES.choose(rng).unwrap_or(&"Token");
        let name = format!("{} {}", base_name, suffix);
        let symbol = format!("{}{}", symbol_stem(base_name), rng.gen_range(10..100));
        let domain = *DOMAINS.choose(rng).unwrap_or(&"app");

        TokenCreationRequest {
            description: describe(rng, base_name, &name),
            name,
            symbol,
            label: *LABELS.choose(rng).unwrap_or(&TokenLabel::Meme),
            web_url: Some(format!(
                "https://{}{}.com",
                base_name.to_lowercase(),
                domain
            )),
            pre_sale: Decimal::ZERO,
            ..Default::default()
        }
    }
}

/// Short names are used whole, longer ones keep three leading letters plus the last.
fn symbol_stem(base_name: &str) -> String {
    let upper = base_name.to_uppercase();
    if upper.chars().count() <= 4 {
        return upper;
    }
    let head: String = upper.chars().take(3).collect();
    let tail = upper.chars().last().map(String::from).unwrap_or_default();
    head + &tail
}

fn describe<R: Rng + ?Sized>(rng: &mut R, base_name: &str, name: &str) -> String {
    match rng.gen_range(0..8) {
        0 => format!(
            "{} is a revolutionary cryptocurrency designed for the future of decentralized finance.",
            name
        ),
        1 => format!(
            "Join the {} revolution! {} brings innovation to the blockchain ecosystem.",
            base_name, name
        ),
        2 => format!(
            "{} - Empowering the next generation of digital assets and smart contracts.",
            name
        ),
        3 => format!(
            "Experience the power of {}! {} is building the future of Web3.",
            base_name, name
        ),
        4 => format!(
            "{} combines cutting-edge technology with community-driven governance.",
            name
        ),
        5 => format!(
            "Welcome to {}! {} is your gateway to decentralized opportunities.",
            base_name, name
        ),
        6 => format!(
            "{} - Where innovation meets opportunity in the world of cryptocurrency.",
            name
        ),
        _ => format!(
            "Discover {}! {} is revolutionizing how we think about digital value.",
            base_name, name
        ),
    }
}
