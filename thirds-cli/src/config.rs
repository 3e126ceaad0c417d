use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct CliConfig {
    pub data_dir: PathBuf,
    pub caller: Option<String>,
    pub verbose: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            caller: None,
            verbose: false,
        }
    }
}

impl CliConfig {
    pub fn new(data_dir: Option<PathBuf>, caller: Option<String>, verbose: bool) -> Self {
        Self {
            data_dir: data_dir.unwrap_or_else(default_data_dir),
            caller,
            verbose,
        }
    }

    pub fn log_filter(&self) -> String {
        let level = if self.verbose { "debug" } else { "info" };
        format!("thirds={0},thirds_game={0},thirds_core={0}", level)
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("thirds")
}
