//! `asgctl check-config`: load a cloud config, validate it, and show how
//! its node-group specs parse.

use std::path::Path;

use anyhow::Result;
use serde_json::json;
use tracing::info;

use asg_core::{CloudConfig, NodeGroupSpec};

pub fn check(path: &str, format: &str) -> Result<()> {
    let config = CloudConfig::from_file(Path::new(path))?;
    config.validate()?;
    let specs = config.node_group_specs()?;
    let rules = specs
        .iter()
        .map(|spec| spec.group_rule().map(|rule| (spec, rule)))
        .collect::<Result<Vec<_>, _>>()?;
    info!(path = %path, groups = specs.len(), "cloud configuration valid");

    match format {
        "json" => {
            let groups: Vec<_> = rules
                .iter()
                .map(|(spec, rule)| {
                    json!({
                        "group": rule.group_name,
                        "rule": rule.rule_name,
                        "min": spec.min_size,
                        "max": spec.max_size,
                    })
                })
                .collect();
            let report = json!({
                "endpoint": config.global.endpoint,
                "region_id": config.global.region_id,
                "cluster_id": config.global.cluster_id,
                "refresh_interval_secs": config.refresh_interval().as_secs(),
                "node_groups": groups,
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            println!("✓ {path}");
            println!("  endpoint:         {}", config.global.endpoint);
            println!("  cluster:          {}/{}", config.global.region_id, config.global.cluster_id);
            println!("  refresh interval: {}s", config.refresh_interval().as_secs());
            for (spec, rule) in &rules {
                println!("  {}", describe(spec, rule.rule_name.as_deref(), &rule.group_name));
            }
        }
    }

    Ok(())
}

fn describe(spec: &NodeGroupSpec, rule: Option<&str>, group: &str) -> String {
    match rule {
        Some(rule) => format!("{group} [rule {rule}] {}..{}", spec.min_size, spec.max_size),
        None => format!("{group} {}..{}", spec.min_size, spec.max_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn config_file(body: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(body.as_bytes()).unwrap();
        file
    }

    const VALID: &str = r#"
node_groups = ["1:10:burst---workers", "0:3:gpu"]

[global]
endpoint = "https://api.example.net"
access_key = "AK"
secret_key = "SK"
cluster_id = "c-1"
region_id = "r-1"

[cache]
refresh_interval = "30m"
"#;

    #[test]
    fn valid_config_passes() {
        let file = config_file(VALID);
        let path = file.path().to_str().unwrap();
        check(path, "text").unwrap();
        check(path, "json").unwrap();
    }

    #[test]
    fn bad_spec_fails() {
        let file = config_file(&VALID.replace("0:3:gpu", "3:0:gpu"));
        assert!(check(file.path().to_str().unwrap(), "text").is_err());
    }

    #[test]
    fn missing_secret_fails() {
        let file = config_file(&VALID.replace("secret_key = \"SK\"", ""));
        let err = check(file.path().to_str().unwrap(), "text").unwrap_err();
        assert!(err.to_string().contains("secret key"));
    }

    #[test]
    fn describe_shows_rule() {
        let spec: NodeGroupSpec = "1:4:burst---workers".parse().unwrap();
        assert_eq!(describe(&spec, Some("burst"), "workers"), "workers [rule burst] 1..4");
        assert_eq!(describe(&spec, None, "workers"), "workers 1..4");
    }
}
