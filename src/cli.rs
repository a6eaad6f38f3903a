//! Interface de linha de comando do roomcast baseada em clap.
//!
//! Define a struct [`Cli`] com subcomandos [`Command`] (send, preview)
//! e flags globais (--config, --max-retries, --verbose).

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::notify::{JobMetadata, Status};

/// roomcast — notificações de status de jobs entregues em salas de chat.
#[derive(Debug, Parser)]
#[command(name = "roomcast", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Caminho do arquivo de configuração (padrão: ./roomcast.toml).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Número máximo de retentativas em caso de falha.
    #[arg(long, global = true)]
    pub max_retries: Option<u32>,

    /// Habilita saída detalhada (verbose).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,
}

/// Status aceito pela CLI, mapeado para [`Status`] internamente.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum StatusArg {
    /// O job terminou com sucesso.
    Success,
    /// O job terminou, mas registrou avisos.
    Warning,
    /// O job falhou.
    Failure,
}

impl From<StatusArg> for Status {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Success => Status::Success,
            StatusArg::Warning => Status::Warning,
            StatusArg::Failure => Status::Failure,
        }
    }
}

/// Dados do job concluído.
#[derive(Debug, Args)]
pub struct JobArgs {
    /// Resultado do job.
    #[arg(long, value_enum, ignore_case = true)]
    pub status: StatusArg,

    /// Nome legível do job.
    #[arg(long)]
    pub label: String,

    /// Identificador do gatilho do job.
    #[arg(long)]
    pub trigger: String,

    /// Início do job (RFC 3339).
    #[arg(long)]
    pub started_at: DateTime<Utc>,

    /// Fim do job (RFC 3339). Padrão: agora.
    #[arg(long)]
    pub finished_at: Option<DateTime<Utc>>,

    /// Arquivo com as linhas de log a anexar.
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl JobArgs {
    pub fn metadata(&self) -> JobMetadata {
        JobMetadata::new(
            self.label.as_str(),
            self.trigger.as_str(),
            self.started_at,
            self.finished_at.unwrap_or_else(Utc::now),
        )
    }
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Envia a notificação, retentando em falhas transitórias.
    Send(JobArgs),

    /// Mostra a mensagem composta sem enviá-la.
    Preview(JobArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses_send_subcommand() {
        let cli = Cli::parse_from([
            "roomcast",
            "send",
            "--status",
            "warning",
            "--label",
            "nightly",
            "--trigger",
            "db_backup",
            "--started-at",
            "2024-03-01T01:00:00Z",
            "--finished-at",
            "2024-03-01T01:30:00Z",
            "--log-file",
            "backup.log",
        ]);
        match cli.command {
            Command::Send(job) => {
                assert!(matches!(job.status, StatusArg::Warning));
                assert_eq!(job.log_file, Some(PathBuf::from("backup.log")));
                let meta = job.metadata();
                assert_eq!(meta.label, "nightly");
                assert_eq!(meta.elapsed_time(), "00:30:00");
            }
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn cli_parses_global_flags() {
        let cli = Cli::parse_from([
            "roomcast",
            "--config",
            "/etc/roomcast.toml",
            "--max-retries",
            "5",
            "--verbose",
            "preview",
            "--status",
            "success",
            "--label",
            "l",
            "--trigger",
            "t",
            "--started-at",
            "2024-03-01T01:00:00Z",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.max_retries, Some(5));
        assert_eq!(cli.config, Some(PathBuf::from("/etc/roomcast.toml")));
        assert!(matches!(cli.command, Command::Preview(_)));
    }

    #[test]
    fn cli_status_ignores_case() {
        let cli = Cli::try_parse_from([
            "roomcast",
            "send",
            "--status",
            "Warning",
            "--label",
            "l",
            "--trigger",
            "t",
            "--started-at",
            "2024-03-01T01:00:00Z",
        ])
        .unwrap();
        match cli.command {
            Command::Send(job) => assert_eq!(Status::from(job.status), Status::Warning),
            _ => panic!("expected Send command"),
        }
    }

    #[test]
    fn cli_rejects_unknown_status() {
        let result = Cli::try_parse_from([
            "roomcast",
            "send",
            "--status",
            "fatal",
            "--label",
            "l",
            "--trigger",
            "t",
            "--started-at",
            "2024-03-01T01:00:00Z",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn status_arg_maps_to_status() {
        assert_eq!(Status::from(StatusArg::Failure), Status::Failure);
    }

    #[test]
    fn cli_verify() {
        Cli::command().debug_assert();
    }
}
