//! Config command implementation.

use anyhow::{bail, Context, Result};
use sharepad_core::config::{format_duration, parse_nonzero_duration, Config};

use super::{ConfigAction, Globals};

/// Every key accepted by `config get` and `config set`.
const KEYS: &[(&str, &str)] = &[
    ("server.port", "Port the server listens on"),
    ("server.localhost_only", "Bind the server to localhost only"),
    ("server.max_body_bytes", "Largest request body the server reads"),
    (
        "server.enforce_image_limit",
        "Reject oversized or malformed images on the server",
    ),
    ("server.max_image_bytes", "Image limit when enforcement is on"),
    ("client.server_url", "Server used by get/put/watch"),
    ("client.poll_interval", "Time between polls (e.g. 5s)"),
    ("client.request_timeout", "Timeout for one request (e.g. 10s)"),
    ("client.max_image_bytes", "Largest image the client uploads"),
    ("ui.default_mode", "Mode shown by watch: text or image"),
    ("ui.show_qr", "Print a QR code when serving"),
];

/// Run the config command.
pub fn run(action: ConfigAction, globals: &Globals) -> Result<()> {
    match action {
        ConfigAction::Get { key } => {
            let Some(value) = get_config_value(&globals.config, &key) else {
                bail!("Unknown configuration key: {key}\nRun `sharepad config list` to see all keys.");
            };
            if globals.json {
                super::print_json(&serde_json::json!({ "key": key, "value": value }))?;
            } else {
                println!("{value}");
            }
        }

        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            set_config_value(&mut config, &key, &value)?;
            config.save()?;
            if globals.chatty() {
                println!("Set {} = {}", key, value);
            }
        }

        ConfigAction::Show => {
            let rendered =
                toml::to_string_pretty(&globals.config).context("Failed to render config")?;
            if globals.json {
                super::print_json(&serde_json::to_value(&globals.config)?)?;
            } else {
                if globals.chatty() {
                    println!("# {}", Config::config_path().display());
                }
                print!("{rendered}");
            }
        }

        ConfigAction::List => {
            for (key, description) in KEYS {
                println!("  {key:<28} {description}");
            }
        }

        ConfigAction::Path => println!("{}", Config::config_path().display()),

        ConfigAction::Reset => {
            Config::default().save()?;
            if globals.chatty() {
                println!("Configuration reset to defaults.");
            }
        }
    }

    Ok(())
}

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    let value = match key {
        "server.port" => config.server.port.to_string(),
        "server.localhost_only" => config.server.localhost_only.to_string(),
        "server.max_body_bytes" => config.server.max_body_bytes.to_string(),
        "server.enforce_image_limit" => config.server.enforce_image_limit.to_string(),
        "server.max_image_bytes" => config.server.max_image_bytes.to_string(),
        "client.server_url" => config.client.server_url.clone(),
        "client.poll_interval" => format_duration(config.client.poll_interval),
        "client.request_timeout" => format_duration(config.client.request_timeout),
        "client.max_image_bytes" => config.client.max_image_bytes.to_string(),
        "ui.default_mode" => config.ui.default_mode.to_string(),
        "ui.show_qr" => config.ui.show_qr.to_string(),
        _ => return None,
    };
    Some(value)
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<()> {
    let invalid = || format!("Invalid value for {key}: {value}");

    match key {
        "server.port" => config.server.port = value.parse().with_context(invalid)?,
        "server.localhost_only" => {
            config.server.localhost_only = value.parse().with_context(invalid)?;
        }
        "server.max_body_bytes" => {
            config.server.max_body_bytes = value.parse().with_context(invalid)?;
        }
        "server.enforce_image_limit" => {
            config.server.enforce_image_limit = value.parse().with_context(invalid)?;
        }
        "server.max_image_bytes" => {
            config.server.max_image_bytes = value.parse().with_context(invalid)?;
        }
        "client.server_url" => config.client.server_url = value.to_string(),
        "client.poll_interval" => {
            config.client.poll_interval = parse_nonzero_duration(value).with_context(invalid)?;
        }
        "client.request_timeout" => {
            config.client.request_timeout =
                parse_nonzero_duration(value).with_context(invalid)?;
        }
        "client.max_image_bytes" => {
            config.client.max_image_bytes = value.parse().with_context(invalid)?;
        }
        "ui.default_mode" => config.ui.default_mode = value.parse()?,
        "ui.show_qr" => config.ui.show_qr = value.parse().with_context(invalid)?,
        _ => bail!("Unknown configuration key: {key}\nRun `sharepad config list` to see all keys."),
    }

    Ok(())
}
