//! ### English
//! JSON-backed configuration store plus the stats-server endpoint file.
//!
//! Both live beside the injected library and are read once at startup:
//! `config.json` (written with defaults when missing) and `server.env`
//! (`SERVER_IP` / `SERVER_PORT` key-value lines). Nothing in the render path
//! ever touches the filesystem.
//!
//! ### 中文
//! 基于 JSON 的配置存储，以及统计服务器端点文件。
//!
//! 二者都位于被注入库旁边，启动时读取一次：`config.json`（缺失时写入
//! 默认值）与 `server.env`（`SERVER_IP` / `SERVER_PORT` 键值行）。渲染
//! 路径永不触碰文件系统。

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use url::Url;

use crate::engine::error::OverlayError;

/// ### English
/// Lowest windowless frame rate the browser accepts.
///
/// ### 中文
/// 浏览器接受的最低离屏帧率。
pub const MIN_BROWSER_FPS: u32 = 10;

/// ### English
/// Highest windowless frame rate the browser accepts.
///
/// ### 中文
/// 浏览器接受的最高离屏帧率。
pub const MAX_BROWSER_FPS: u32 = 120;

/// ### English
/// Overlay configuration persisted as `config.json`. Unknown keys are
/// ignored, missing keys fall back to defaults, so old files keep working.
///
/// ### 中文
/// 以 `config.json` 持久化的 overlay 配置。未知键被忽略，缺失键回退到
/// 默认值，旧文件可继续使用。
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// ### English
    /// Requested windowless paint rate for the embedded browser.
    ///
    /// ### 中文
    /// 为内嵌浏览器请求的离屏绘制帧率。
    pub browser_fps: u32,
    /// ### English
    /// Whether the browser side should open its remote-debugging port.
    ///
    /// ### 中文
    /// 浏览器侧是否开启远程调试端口。
    pub browser_debugging_enabled: bool,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            browser_fps: 60,
            browser_debugging_enabled: false,
        }
    }
}

impl OverlayConfig {
    /// ### English
    /// Frame rate clamped into the range the browser accepts.
    ///
    /// ### 中文
    /// 压缩到浏览器可接受范围内的帧率。
    pub fn effective_fps(&self) -> u32 {
        self.browser_fps.clamp(MIN_BROWSER_FPS, MAX_BROWSER_FPS)
    }

    /// ### English
    /// Reads the configuration from `path`, writing (and returning) defaults
    /// when the file does not exist yet.
    ///
    /// #### Parameters
    /// - `path`: Location of `config.json`.
    ///
    /// ### 中文
    /// 从 `path` 读取配置；文件尚不存在时写入并返回默认值。
    ///
    /// #### 参数
    /// - `path`：`config.json` 的位置。
    pub fn load_or_create(path: &Path) -> Result<Self, OverlayError> {
        if !path.exists() {
            info!(path = %path.display(), "configuration file missing, writing defaults");
            let config = Self::default();
            config.save(path)?;
            return Ok(config);
        }

        let text = std::fs::read_to_string(path)
            .map_err(|err| OverlayError::Config(format!("read {}: {err}", path.display())))?;
        serde_json::from_str(&text)
            .map_err(|err| OverlayError::Config(format!("parse {}: {err}", path.display())))
    }

    /// ### English
    /// Writes the configuration as pretty-printed JSON.
    ///
    /// #### Parameters
    /// - `path`: Destination file.
    ///
    /// ### 中文
    /// 将配置以带缩进的 JSON 写出。
    ///
    /// #### 参数
    /// - `path`：目标文件。
    pub fn save(&self, path: &Path) -> Result<(), OverlayError> {
        let text = serde_json::to_string_pretty(self)
            .map_err(|err| OverlayError::Config(format!("serialize config: {err}")))?;
        std::fs::write(path, text)
            .map_err(|err| OverlayError::Config(format!("write {}: {err}", path.display())))
    }
}

/// ### English
/// Stats-server endpoint the in-game page is served from.
///
/// ### 中文
/// 游戏内页面来源的统计服务器端点。
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerEndpoint {
    /// ### English
    /// Server host or IP.
    ///
    /// ### 中文
    /// 服务器主机名或 IP。
    pub host: String,
    /// ### English
    /// Server TCP port.
    ///
    /// ### 中文
    /// 服务器 TCP 端口。
    pub port: u16,
}

impl Default for ServerEndpoint {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 24050,
        }
    }
}

impl ServerEndpoint {
    /// ### English
    /// Parses `KEY=VALUE` lines (`SERVER_IP`, `SERVER_PORT`), skipping blank
    /// lines, `#` comments and anything malformed. Unparseable values keep
    /// their defaults.
    ///
    /// #### Parameters
    /// - `text`: The env file contents.
    ///
    /// ### 中文
    /// 解析 `KEY=VALUE` 行（`SERVER_IP`、`SERVER_PORT`），跳过空行、`#`
    /// 注释与一切格式错误的内容。无法解析的值保持默认。
    ///
    /// #### 参数
    /// - `text`：env 文件内容。
    pub fn parse_env(text: &str) -> Self {
        let mut endpoint = Self::default();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };

            match key.trim() {
                "SERVER_IP" => {
                    let value = value.trim();
                    if !value.is_empty() {
                        endpoint.host = value.to_string();
                    }
                }
                "SERVER_PORT" => {
                    if let Ok(port) = value.trim().parse() {
                        endpoint.port = port;
                    }
                }
                _ => {}
            }
        }

        endpoint
    }

    /// ### English
    /// Loads the endpoint from an env file, falling back to defaults when the
    /// file is missing or unreadable.
    ///
    /// #### Parameters
    /// - `path`: Location of `server.env`.
    ///
    /// ### 中文
    /// 从 env 文件加载端点；文件缺失或不可读时回退到默认值。
    ///
    /// #### 参数
    /// - `path`：`server.env` 的位置。
    pub fn from_env_file(path: &Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(text) => Self::parse_env(&text),
            Err(err) => {
                warn!(path = %path.display(), "endpoint file not read, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// ### English
    /// The in-game overlay page URL for this endpoint.
    ///
    /// ### 中文
    /// 该端点对应的游戏内 overlay 页面 URL。
    pub fn ingame_url(&self) -> Result<Url, OverlayError> {
        Url::parse(&format!("http://{}:{}/api/ingame", self.host, self.port))
            .map_err(|err| OverlayError::Config(format!("endpoint url: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "web-overlay-config-{}-{name}",
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join("config.json")
    }

    #[test]
    fn missing_file_creates_defaults_on_disk() {
        let path = temp_path("create");
        let _ = std::fs::remove_file(&path);

        let config = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(config, OverlayConfig::default());
        assert!(path.exists());

        // Second load reads the file it just wrote.
        let reloaded = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(reloaded, config);
    }

    #[test]
    fn partial_json_falls_back_per_field() {
        let path = temp_path("partial");
        std::fs::write(&path, r#"{ "browser_fps": 30 }"#).unwrap();

        let config = OverlayConfig::load_or_create(&path).unwrap();
        assert_eq!(config.browser_fps, 30);
        assert!(!config.browser_debugging_enabled);
    }

    #[test]
    fn fps_is_clamped_to_browser_range() {
        let slow = OverlayConfig {
            browser_fps: 1,
            ..OverlayConfig::default()
        };
        let fast = OverlayConfig {
            browser_fps: 500,
            ..OverlayConfig::default()
        };
        assert_eq!(slow.effective_fps(), MIN_BROWSER_FPS);
        assert_eq!(fast.effective_fps(), MAX_BROWSER_FPS);
    }

    #[test]
    fn env_parsing_skips_comments_and_garbage() {
        let endpoint = ServerEndpoint::parse_env(
            "# comment\n\
             \n\
             SERVER_IP=192.168.1.20\n\
             not a pair\n\
             SERVER_PORT=9001\n\
             SERVER_PORT=notaport\n",
        );
        assert_eq!(endpoint.host, "192.168.1.20");
        assert_eq!(endpoint.port, 9001);
    }

    #[test]
    fn missing_env_file_uses_defaults() {
        let endpoint =
            ServerEndpoint::from_env_file(Path::new("/definitely/not/here/server.env"));
        assert_eq!(endpoint, ServerEndpoint::default());
    }

    #[test]
    fn ingame_url_is_composed_from_endpoint() {
        let url = ServerEndpoint::default().ingame_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:24050/api/ingame");
    }
}
