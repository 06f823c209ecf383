//! ### English
//! Startup sequence for the injected library.
//!
//! Runs on a dedicated thread spawned from the library entry point, never on
//! the loader lock: resolve the module directory → diagnostics → config →
//! endpoint → runtime → swap-chain detour. Every step that fails leaves the
//! overlay inert and the host untouched.
//!
//! ### 中文
//! 被注入库的启动序列。
//!
//! 在库入口点派生的专用线程上运行，绝不在 loader 锁内：解析模块目录 →
//! 诊断 → 配置 → 端点 → 运行时 → 交换链 detour。任何一步失败都只会让
//! overlay 静默，宿主不受影响。

use std::path::Path;

use tracing::{error, info, warn};

use crate::engine::config::{OverlayConfig, ServerEndpoint};
use crate::engine::runtime::OverlayRuntime;
use crate::engine::{diag, hook};

/// ### English
/// Runs the full startup sequence with the directory holding the injected
/// library. Infallible from the caller's perspective: failures are logged
/// (where logging got far enough) and degrade to an inert overlay.
///
/// #### Parameters
/// - `module_dir`: Directory containing the injected library.
///
/// ### 中文
/// 以被注入库所在目录运行完整启动序列。对调用方而言不会失败：错误会被
/// 记录（若日志已可用）并退化为静默的 overlay。
///
/// #### 参数
/// - `module_dir`：被注入库所在目录。
pub fn start(module_dir: &Path) {
    match diag::init(&module_dir.join("logs")) {
        Ok(log_path) => info!(log = %log_path.display(), "overlay diagnostics ready"),
        Err(_) => {
            // No subscriber: events below simply go nowhere.
        }
    }

    let config = OverlayConfig::load_or_create(&module_dir.join("config.json"))
        .unwrap_or_else(|err| {
            warn!("configuration unusable, falling back to defaults: {err}");
            OverlayConfig::default()
        });
    let endpoint = ServerEndpoint::from_env_file(&module_dir.join("server.env"));
    match endpoint.ingame_url() {
        Ok(url) => info!(fps = config.effective_fps(), url = %url, "overlay configured"),
        Err(err) => warn!("endpoint does not form a valid url: {err}"),
    }

    let _runtime = OverlayRuntime::install(config, endpoint);

    match hook::install() {
        Ok(()) => info!("swap-chain hook installed"),
        Err(err) => error!("overlay inert: {err}"),
    }
}
