/// ISO 3166 alpha-2 codes the headline endpoint accepts, lowercase
pub const SUPPORTED_COUNTRIES: &[&str] = &[
    "ae", "ar", "at", "au", "be", "bg", "br", "ca", "ch", "cn", "co", "cu", "cz", "de", "eg",
    "fr", "gb", "gr", "hk", "hu", "id", "ie", "il", "in", "it", "jp", "kr", "lt", "lv", "ma",
    "mx", "my", "ng", "nl", "no", "nz", "ph", "pl", "pt", "ro", "rs", "ru", "sa", "se", "sg",
    "si", "sk", "th", "tr", "tw", "ua", "us", "ve", "za",
];

pub const DEFAULT_COUNTRY: &str = "us";

/// Case-insensitive allowlist check
pub fn is_supported(country_code: &str) -> bool {
    let code = country_code.trim().to_ascii_lowercase();
    SUPPORTED_COUNTRIES.contains(&code.as_str())
}
