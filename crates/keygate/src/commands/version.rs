//! Version command

use crate::cli::VersionArgs;
use crate::output;
use crate::version::VersionInfo;
use anyhow::Result;

pub fn run(args: VersionArgs) -> Result<()> {
    let info = VersionInfo::current();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("{}", info);
    let readable: Vec<String> = info
        .readable_formats
        .iter()
        .map(|v| format!("v{}", v))
        .collect();
    output::kv("reads", &readable.join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_binary_and_format() {
        let info = VersionInfo::current();
        let display = info.to_string();

        assert!(display.starts_with("keygate "));
        assert!(display.contains(info.version));
        assert!(display.ends_with("(secrets format v1)"));
    }

    #[test]
    fn test_current_format_is_readable() {
        let info = VersionInfo::current();
        assert!(info.readable_formats.contains(&info.secrets_format));
        assert_eq!(info.readable_formats, vec![0, 1]);
    }

    #[test]
    fn test_json_serialization() {
        let json = serde_json::to_value(VersionInfo::current()).unwrap();
        assert_eq!(json["secrets_format"], 1);
        assert_eq!(json["version"], env!("CARGO_PKG_VERSION"));
    }
}
