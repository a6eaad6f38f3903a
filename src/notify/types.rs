//! Tipos de dados do pipeline de notificação.
//!
//! Contém o status do job, os metadados lidos do job concluído, a
//! configuração imutável do notificador e os valores produzidos a cada
//! tentativa de entrega ([`ComposedMessage`], [`DeliveryResult`]).

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use reqwest::Url;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};

use super::error::NotifyError;

/// Endpoint padrão da API de mensagens.
pub const DEFAULT_ENDPOINT: &str = "https://api.ciscospark.com/v1/messages";

/// Template padrão do título da mensagem.
pub const DEFAULT_MESSAGE_TEMPLATE: &str = "[{status}] {label} ({trigger})";

/// Resultado de um job concluído.
///
/// Aceita `success`, `warning` e `failure` sem diferenciar maiúsculas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Status {
    Success,
    Warning,
    Failure,
}

impl Status {
    /// Todos os status, na ordem de severidade.
    pub const ALL: [Status; 3] = [Status::Success, Status::Warning, Status::Failure];
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => write!(f, "Success"),
            Status::Warning => write!(f, "Warning"),
            Status::Failure => write!(f, "Failure"),
        }
    }
}

impl FromStr for Status {
    type Err = NotifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "success" => Ok(Status::Success),
            "warning" => Ok(Status::Warning),
            "failure" => Ok(Status::Failure),
            other => Err(NotifyError::Config(format!("unknown status: {other}"))),
        }
    }
}

impl TryFrom<String> for Status {
    type Error = NotifyError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Metadados do job concluído. Somente leitura para o notificador.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobMetadata {
    pub label: String,
    pub trigger: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub duration: TimeDelta,
}

impl JobMetadata {
    /// Cria os metadados calculando a duração a partir dos timestamps.
    pub fn new(
        label: impl Into<String>,
        trigger: impl Into<String>,
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
    ) -> Self {
        Self {
            label: label.into(),
            trigger: trigger.into(),
            started_at,
            finished_at,
            duration: finished_at - started_at,
        }
    }

    /// Duração formatada como `HH:MM:SS`. Durações negativas viram zero.
    pub fn elapsed_time(&self) -> String {
        let secs = self.duration.num_seconds().max(0);
        format!(
            "{:02}:{:02}:{:02}",
            secs / 3600,
            (secs % 3600) / 60,
            secs % 60
        )
    }
}

/// Provedor preguiçoso das linhas de log formatadas.
///
/// Só é consultado quando o status exige o anexo do log.
pub trait LogSource {
    fn log_lines(&self) -> Vec<String>;
}

impl<S: AsRef<str>> LogSource for [S] {
    fn log_lines(&self) -> Vec<String> {
        self.iter().map(|line| line.as_ref().to_owned()).collect()
    }
}

impl<S: AsRef<str>> LogSource for Vec<S> {
    fn log_lines(&self) -> Vec<String> {
        self.as_slice().log_lines()
    }
}

/// Configuração validada do notificador.
///
/// Construída uma única vez e compartilhada por referência entre as
/// tentativas de entrega; não há setters.
#[derive(Debug, Clone)]
pub struct NotificationConfig {
    endpoint: Url,
    token: String,
    room_id: String,
    send_log_on: BTreeSet<Status>,
    message_template: String,
}

impl NotificationConfig {
    /// Valida e cria a configuração.
    ///
    /// O endpoint precisa usar `https`, exceto para hosts de loopback.
    pub fn new(
        endpoint: &str,
        token: impl Into<String>,
        room_id: impl Into<String>,
        send_log_on: impl IntoIterator<Item = Status>,
    ) -> Result<Self, NotifyError> {
        let token = token.into();
        let room_id = room_id.into();
        if token.trim().is_empty() {
            return Err(NotifyError::Config("token must not be empty".into()));
        }
        if HeaderValue::from_str(&format!("Bearer {token}")).is_err() {
            return Err(NotifyError::Config(
                "token contains characters not allowed in a header".into(),
            ));
        }
        if room_id.trim().is_empty() {
            return Err(NotifyError::Config("room_id must not be empty".into()));
        }

        let endpoint = Url::parse(endpoint)
            .map_err(|e| NotifyError::Config(format!("invalid endpoint {endpoint:?}: {e}")))?;
        let loopback = matches!(
            endpoint.host_str(),
            Some("localhost" | "127.0.0.1" | "[::1]")
        );
        if endpoint.scheme() != "https" && !(endpoint.scheme() == "http" && loopback) {
            return Err(NotifyError::Config(format!(
                "endpoint must use https: {endpoint}"
            )));
        }

        Ok(Self {
            endpoint,
            token,
            room_id,
            send_log_on: send_log_on.into_iter().collect(),
            message_template: DEFAULT_MESSAGE_TEMPLATE.to_string(),
        })
    }

    /// Substitui o template do título (`{status}`, `{label}`, `{trigger}`).
    pub fn with_message_template(mut self, template: impl Into<String>) -> Self {
        self.message_template = template.into();
        self
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn room_id(&self) -> &str {
        &self.room_id
    }

    pub fn send_log_on(&self) -> &BTreeSet<Status> {
        &self.send_log_on
    }

    pub fn message_template(&self) -> &str {
        &self.message_template
    }
}

/// Statuses whose notification carries the log attachment by default.
pub fn default_send_log_on() -> BTreeSet<Status> {
    BTreeSet::from([Status::Warning, Status::Failure])
}

/// Mensagem composta para uma única tentativa.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedMessage {
    pub text: String,
    pub attachment: Option<Vec<u8>>,
}

/// Classificação de uma falha de entrega.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// Token, sala ou payload inválidos.
    Configuration,
    /// Falha de rede; `timed_out` indica que o timeout foi atingido.
    Transport { timed_out: bool },
    /// Resposta HTTP fora de 2xx.
    ServerRejection,
}

/// Resultado de uma tentativa de entrega.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub succeeded: bool,
    pub status_code: Option<u16>,
    pub error_detail: Option<String>,
    pub failure: Option<FailureKind>,
}

impl DeliveryResult {
    pub fn delivered(status_code: u16) -> Self {
        Self {
            succeeded: true,
            status_code: Some(status_code),
            error_detail: None,
            failure: None,
        }
    }

    /// Converte um erro em resultado de falha, preservando código e mensagem.
    ///
    /// Erros na montagem da requisição (cabeçalho inválido, por exemplo)
    /// contam como erro de configuração, não de rede.
    pub fn failed(error: &NotifyError) -> Self {
        let (status_code, kind) = match error {
            NotifyError::Config(_) => (None, FailureKind::Configuration),
            NotifyError::Transport(e) if e.is_builder() => (None, FailureKind::Configuration),
            NotifyError::Transport(e) => (
                e.status().map(|s| s.as_u16()),
                FailureKind::Transport {
                    timed_out: error.is_timeout(),
                },
            ),
            NotifyError::ServerRejection { code, .. } => {
                (Some(*code), FailureKind::ServerRejection)
            }
        };
        Self {
            succeeded: false,
            status_code,
            error_detail: Some(error.to_string()),
            failure: Some(kind),
        }
    }
}
