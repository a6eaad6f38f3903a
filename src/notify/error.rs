//! Tipos de erro para o núcleo de entrega de notificações.
//!
//! Define [`NotifyError`] com variantes para erros de configuração, falhas
//! de transporte e respostas rejeitadas pelo servidor. Usa `thiserror` para
//! derivar `Display` e `Error` a partir dos atributos `#[error(...)]`.

use thiserror::Error;

/// Erros que podem ocorrer ao montar ou entregar uma notificação.
///
/// As variantes seguem a taxonomia de falhas da entrega:
/// - [`Config`](NotifyError::Config) — token, sala ou endpoint inválidos; nunca retentável
/// - [`Transport`](NotifyError::Transport) — conexão recusada, TLS, timeout
/// - [`ServerRejection`](NotifyError::ServerRejection) — qualquer resposta HTTP fora de 2xx
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Configuração ausente ou inválida. Deve ser reportada imediatamente.
    #[error("configuration error: {0}")]
    Config(String),

    /// Falha na camada de rede (DNS, conexão recusada, TLS, timeout).
    /// Encapsula o erro original do `reqwest` via `#[from]`.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// O servidor respondeu com um status fora da faixa 2xx.
    #[error("Invalid server response {code}: {reason}")]
    ServerRejection { code: u16, reason: String },
}

impl NotifyError {
    /// Returns `true` when the underlying transport error was a timeout.
    pub fn is_timeout(&self) -> bool {
        matches!(self, NotifyError::Transport(e) if e.is_timeout())
    }
}
