/// Parse the browser global name for UMD targets.
///
/// UMD targets assign `global["<name>"]`, so any non-blank name without
/// line breaks is accepted, including package names like `mbd-wasm`.
///
/// # Errors
///
/// Returns an error message if the name is blank or spans lines.
pub fn parse_global(s: &str) -> Result<String, String> {
    if s.trim().is_empty() {
        return Err("Global name cannot be empty".to_string());
    }
    if s.contains(['\n', '\r']) {
        return Err(format!("Global name cannot contain line breaks: {:?}", s));
    }
    Ok(s.to_string())
}

/// Parse a four-digit copyright year.
pub fn parse_year(s: &str) -> Result<i32, String> {
    let year: i32 = s
        .parse()
        .map_err(|_| format!("Year must be a number: '{}'", s))?;
    if !(1970..=9999).contains(&year) {
        return Err(format!("Year out of range (1970-9999): {}", year));
    }
    Ok(year)
}
