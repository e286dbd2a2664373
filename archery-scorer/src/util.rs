use anyhow::{Context, Result};

pub fn split_csv(s: &str) -> Vec<String> {
    s.split(',')
        .map(|x| x.trim().to_string())
        .filter(|x| !x.is_empty())
        .collect()
}

/// Parse a comma-separated list of end scores.
pub fn parse_scores(s: &str) -> Result<Vec<u32>> {
    split_csv(s)
        .iter()
        .enumerate()
        .map(|(idx, token)| {
            token
                .parse::<u32>()
                .with_context(|| format!("score #{} ('{token}') is not a whole number", idx + 1))
        })
        .collect()
}

/// Session ids become file names, so only a conservative alphabet is allowed.
pub fn is_valid_session_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 64
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
