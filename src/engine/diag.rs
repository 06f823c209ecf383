//! ### English
//! Process-wide diagnostics: a `tracing` subscriber writing to one log file
//! per launch, created beside the injected library.
//!
//! The overlay has no console and no user-visible error surface; the log
//! file is the only way to see why it went inert. Nothing on the per-frame
//! path emits events.
//!
//! ### 中文
//! 进程级诊断：`tracing` 订阅者，每次启动在被注入库旁创建一个日志文件。
//!
//! overlay 没有控制台，也没有面向用户的错误界面；日志文件是了解其静默
//! 原因的唯一途径。每帧路径上不产生任何事件。

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::engine::error::OverlayError;

/// ### English
/// Creates `log_dir` if needed and installs the global subscriber writing to
/// `web_overlay_<millis>.log`. Returns the log file path. Failing to install
/// (e.g. a subscriber already set by the host) is an error the caller may
/// ignore, since the overlay works without diagnostics.
///
/// #### Parameters
/// - `log_dir`: Directory for per-launch log files.
///
/// ### 中文
/// 按需创建 `log_dir`，并安装写入 `web_overlay_<millis>.log` 的全局订阅
/// 者。返回日志文件路径。安装失败（例如宿主已设置订阅者）是调用方可以
/// 忽略的错误：overlay 没有诊断也能工作。
///
/// #### 参数
/// - `log_dir`：每次启动日志文件的目录。
pub fn init(log_dir: &Path) -> Result<PathBuf, OverlayError> {
    std::fs::create_dir_all(log_dir)
        .map_err(|err| OverlayError::Config(format!("create {}: {err}", log_dir.display())))?;

    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let path = log_dir.join(format!("web_overlay_{millis}.log"));

    let file = std::fs::File::create(&path)
        .map_err(|err| OverlayError::Config(format!("create {}: {err}", path.display())))?;

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(Arc::new(file))
        .try_init()
        .map_err(|err| OverlayError::Config(format!("install subscriber: {err}")))?;

    Ok(path)
}
