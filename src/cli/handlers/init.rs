use crate::cli::commands::InitArgs;
use crate::io::config_io;
use crate::model::Profile;
use crate::store::{FileStore, Store};

const CONFIG_TEMPLATE: &str = r##"# topicflow workspace settings

[user]
# Id stamped on everything you post. Leave empty to sign out.
id = "{user}"
{nickname}
[suggest]
# Candidates shown per #/@ suggestion list (1-10)
page_size = 10

[display]
# Characters of task text shown in list previews
preview_chars = 100

[store]
# Store file, relative to .topicflow/
file = "store.json"
"##;

/// Fill in the config template. `nickname` is left commented out when not
/// given.
fn render_config(user: &str, nickname: Option<&str>) -> String {
    let nickname_line = match nickname {
        Some(n) => format!("nickname = \"{}\"\n", escape_toml(n)),
        None => "# nickname = \"\"\n".to_string(),
    };
    CONFIG_TEMPLATE
        .replace("{user}", &escape_toml(user))
        .replace("{nickname}\n", &nickname_line)
}

fn escape_toml(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

pub fn cmd_init(args: InitArgs, dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    let root = match dir {
        Some(d) => std::path::PathBuf::from(d),
        None => std::env::current_dir()?,
    };

    // Warn about an enclosing workspace, the new one will shadow it
    if let Some(parent) = root.parent()
        && let Ok(outer) = config_io::discover_root(parent)
    {
        eprintln!(
            "Note: enclosing workspace found at {}/",
            config_io::data_dir(&outer).display()
        );
    }

    let user = args
        .user
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let dir = config_io::create_data_dir(&root, &render_config(&user, args.nickname.as_deref()))?;

    // The store file exists from the start; the nickname becomes the
    // profile shown on comments
    let config = config_io::load_config(&root)?;
    let mut store = FileStore::open(&config_io::store_path(&root, &config))?;
    match args.nickname {
        Some(nickname) => {
            store.upsert_profile(Profile {
                id: user.clone(),
                nickname: Some(nickname),
                avatar_url: None,
            })?;
        }
        None => store.flush()?,
    }

    println!("Initialized topicflow workspace in {}/", dir.display());
    println!("  user: {}", user);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::config::Config;

    #[test]
    fn test_template_parses() {
        let text = render_config("u-1", None);
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.user.id, "u-1");
        assert_eq!(config.user.nickname, None);
        assert_eq!(config.suggest.page_size, 10);
        assert_eq!(config.display.preview_chars, 100);
        assert_eq!(config.store.file, "store.json");
    }

    #[test]
    fn test_template_with_nickname_is_escaped() {
        let text = render_config("u-1", Some("Ann \"the\" Dev"));
        let config: Config = toml::from_str(&text).unwrap();
        assert_eq!(config.user.nickname.as_deref(), Some("Ann \"the\" Dev"));
    }
}
