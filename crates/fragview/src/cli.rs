use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "fragview",
    author,
    version,
    about = "Live GLSL shader preview with hot reload",
    arg_required_else_help = false
)]
pub struct Cli {
    /// Directory containing `vertex.glsl` and `fragment.glsl`; starter
    /// shaders are installed here on first run.
    #[arg(long, value_name = "DIR", default_value = "shaders")]
    pub shaders: PathBuf,

    /// Window size (e.g. `1280x720`).
    #[arg(long, value_name = "WIDTHxHEIGHT", default_value = "800x600", value_parser = parse_size)]
    pub size: (u32, u32),

    /// Fragment-source poll interval in milliseconds.
    #[arg(long = "poll-ms", value_name = "MILLIS", default_value_t = 500)]
    pub poll_ms: u64,
}

pub fn parse() -> Cli {
    Cli::parse()
}

fn parse_size(value: &str) -> Result<(u32, u32), String> {
    let (width, height) = value
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT (e.g. 1280x720), got `{value}`"))?;
    let width: u32 = width
        .trim()
        .parse()
        .map_err(|_| format!("invalid width in `{value}`"))?;
    let height: u32 = height
        .trim()
        .parse()
        .map_err(|_| format!("invalid height in `{value}`"))?;
    if width == 0 || height == 0 {
        return Err(format!("window size must be non-zero, got `{value}`"));
    }
    Ok((width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_invocation_uses_defaults() {
        let cli = Cli::try_parse_from(["fragview"]).expect("defaults parse");
        assert_eq!(cli.shaders, PathBuf::from("shaders"));
        assert_eq!(cli.size, (800, 600));
        assert_eq!(cli.poll_ms, 500);
    }

    #[test]
    fn size_accepts_either_separator_case() {
        let cli = Cli::try_parse_from(["fragview", "--size", "1920X1080"]).expect("parse");
        assert_eq!(cli.size, (1920, 1080));
    }

    #[test]
    fn malformed_size_is_rejected() {
        assert!(Cli::try_parse_from(["fragview", "--size", "1280"]).is_err());
        assert!(Cli::try_parse_from(["fragview", "--size", "0x600"]).is_err());
        assert!(Cli::try_parse_from(["fragview", "--size", "widexhigh"]).is_err());
    }

    #[test]
    fn poll_interval_is_overridable() {
        let cli = Cli::try_parse_from(["fragview", "--poll-ms", "100"]).expect("parse");
        assert_eq!(cli.poll_ms, 100);
    }
}
