//! Config command: prints the effective configuration.

use anyhow::Result;

use crate::Config;

/// Format the configuration as pretty JSON.
pub fn format_config(config: &Config) -> Result<String> {
    Ok(serde_json::to_string_pretty(config)?)
}

/// Runs the config command.
pub fn run(config: &Config) -> Result<()> {
    println!("{}", format_config(config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use insta::assert_snapshot;

    #[test]
    fn test_config_output() {
        let config = Config {
            events_path: PathBuf::from("/data/tg/events.json"),
            ..Config::default()
        };

        assert_snapshot!(format_config(&config).unwrap(), @r#"
        {
          "events_path": "/data/tg/events.json",
          "viewport": {
            "width": 1024.0,
            "height": 768.0
          },
          "timeline": {
            "hour_pixel_height": 60.0,
            "day_column_pixel_width": 120.0,
            "graduation_minutes": 10,
            "max_visible_all_day_rows": 2.5,
            "min_segment_pixel_height": 20.0,
            "all_day_row_pixel_height": 24.0,
            "hour_ruler_pixel_width": 56.0,
            "day_header_pixel_height": 44.0,
            "resize_handle_pixel_height": 10.0,
            "zero_duration_display_minutes": 30,
            "converted_timed_duration_minutes": 60
          }
        }
        "#);
    }
}
