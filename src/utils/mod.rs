use url::Url;

/// Format file size in human-readable format
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: &[&str] = &["B", "KB", "MB", "GB", "TB"];
    const THRESHOLD: f64 = 1024.0;

    if bytes == 0 {
        return "0 B".to_string();
    }

    let bytes_f = bytes as f64;
    let unit_index = (bytes_f.log10() / THRESHOLD.log10()).floor() as usize;
    let unit_index = unit_index.min(UNITS.len() - 1);

    let size = bytes_f / THRESHOLD.powi(unit_index as i32);

    if unit_index == 0 {
        format!("{} {}", bytes, UNITS[unit_index])
    } else {
        format!("{:.1} {}", size, UNITS[unit_index])
    }
}

/// Extract domain from URL for display purposes
pub fn extract_domain(url: &str) -> Option<String> {
    Url::parse(url.trim()).ok()?.host_str().map(|host| {
        host.strip_prefix("www.").unwrap_or(host).to_string()
    })
}

/// Session command typed at the prompt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Submit(crate::ArtifactType),
    Save,
    State,
    Help,
    Quit,
    /// Anything else replaces the input field
    Input(String),
}

/// Parse one line of interactive input
pub fn parse_session_line(line: &str) -> SessionCommand {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return SessionCommand::Input(line.trim_end_matches(['\r', '\n']).to_string());
    };

    match command.to_lowercase().as_str() {
        "save" => SessionCommand::Save,
        "state" => SessionCommand::State,
        "help" | "?" => SessionCommand::Help,
        "quit" | "q" | "exit" => SessionCommand::Quit,
        other => match other.parse() {
            Ok(artifact) => SessionCommand::Submit(artifact),
            Err(_) => SessionCommand::Help,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ArtifactType;

    #[test]
    fn test_format_file_size() {
        assert_eq!(format_file_size(0), "0 B");
        assert_eq!(format_file_size(512), "512 B");
        assert_eq!(format_file_size(1024), "1.0 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(1048576), "1.0 MB");
    }

    #[test]
    fn test_extract_domain() {
        assert_eq!(extract_domain("https://www.instagram.com/reel/abc/"), Some("instagram.com".to_string()));
        assert_eq!(extract_domain("https://tiktok.com/@user/video/1"), Some("tiktok.com".to_string()));
        assert_eq!(extract_domain("invalid-url"), None);
    }

    #[test]
    fn test_parse_session_line() {
        assert_eq!(parse_session_line(":video"), SessionCommand::Submit(ArtifactType::Video));
        assert_eq!(parse_session_line(" :Subtitles "), SessionCommand::Submit(ArtifactType::Subtitles));
        assert_eq!(parse_session_line(":save"), SessionCommand::Save);
        assert_eq!(parse_session_line(":q"), SessionCommand::Quit);
        assert_eq!(parse_session_line(":bogus"), SessionCommand::Help);
        assert_eq!(
            parse_session_line("https://www.instagram.com/reel/abc/\n"),
            SessionCommand::Input("https://www.instagram.com/reel/abc/".to_string())
        );
        assert_eq!(parse_session_line("   "), SessionCommand::Input("   ".to_string()));
    }
}
