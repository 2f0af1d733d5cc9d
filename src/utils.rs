//! 日志与 panic hook 等通用工具。

/// 在浏览器中写入 `console.log`，原生环境下写到 stderr。
#[macro_export]
macro_rules! log {
    ($($t:tt)*) => {
        $crate::utils::log_line(&format!($($t)*))
    };
}

#[cfg(target_arch = "wasm32")]
pub fn log_line(message: &str) {
    web_sys::console::log_1(&message.into());
}

#[cfg(not(target_arch = "wasm32"))]
pub fn log_line(message: &str) {
    eprintln!("{message}");
}

#[cfg(feature = "console_error_panic_hook")]
pub fn set_panic_hook() {
    // 让 wasm 中的 panic 信息出现在浏览器控制台里。
    console_error_panic_hook::set_once();
}

#[cfg(not(feature = "console_error_panic_hook"))]
pub fn set_panic_hook() {}
