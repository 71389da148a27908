use std::sync::Once;

pub mod datetime;
pub mod http;
pub mod text;

static RUSTLS_PROVIDER: Once = Once::new();

/// reqwest 編譯時沒有指定 crypto provider，在建立任何 TLS 連線前要先安裝 ring
pub fn ensure_rustls_crypto_provider() {
    RUSTLS_PROVIDER.call_once(|| {
        // 已經有其他地方安裝過時會回傳 Err，可以忽略
        let _ = rustls::crypto::ring::default_provider().install_default();
    });
}
