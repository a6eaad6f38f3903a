//! Interface de terminal do roomcast — spinners e saída colorida.
//!
//! Usa as crates `indicatif` para spinners de progresso e `console` para
//! estilização com cores. O [`DeliveryProgress`] acompanha visualmente
//! a entrega de uma notificação no terminal.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::driver::DispatchObserver;
use crate::notify::ComposedMessage;
use crate::state_machine::{DispatchRecord, DispatchStatus};

/// Indicador visual de progresso para a entrega de uma notificação.
///
/// Exibe um spinner animado durante o envio e mensagens coloridas para
/// sucesso (verde), falha (vermelho) e retentativa (amarelo).
pub struct DeliveryProgress {
    pb: ProgressBar,
    green: Style,
    red: Style,
    yellow: Style,
}

impl DeliveryProgress {
    /// Inicia o spinner com a descrição da notificação.
    pub fn start(description: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        // O template é fixo; em caso de erro mantém o estilo padrão.
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("SENDING: {description}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            red: Style::new().red().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Finaliza o spinner e exibe o resultado da entrega.
    pub fn complete(&self, record: &DispatchRecord) {
        self.pb.finish_and_clear();
        match record.outcome {
            DispatchStatus::Delivered => println!(
                "  {} Notification delivered after {} attempt(s)",
                self.green.apply_to("✓"),
                record.attempts
            ),
            DispatchStatus::Skipped => println!(
                "  {} Notifications disabled for {:?} status",
                self.yellow.apply_to("-"),
                record.status
            ),
            _ => println!("  {} Notification not delivered", self.red.apply_to("✗")),
        }
    }

    /// Finaliza o spinner exibindo o erro fatal.
    pub fn fail(&self, error: &dyn std::fmt::Display) {
        self.pb.finish_and_clear();
        println!("  {} {error}", self.red.apply_to("✗"));
    }

    /// Imprime o registro da entrega formatado em JSON.
    pub fn print_record(&self, record: &DispatchRecord) {
        let style = match record.outcome {
            DispatchStatus::Delivered => &self.green,
            DispatchStatus::Failed => &self.red,
            _ => &self.yellow,
        };
        println!();
        println!("{}", style.apply_to("─── Dispatch Record ───"));
        println!(
            "{}",
            serde_json::to_string_pretty(record).unwrap_or_default()
        );
    }
}

impl DispatchObserver for DeliveryProgress {
    fn retrying(&self, retry: u32, max: u32, reason: &str, wait: Duration) {
        self.pb.println(format!(
            "  {} Retry {retry}/{max}: {reason} (waiting {}s)",
            self.yellow.apply_to("↻"),
            wait.as_secs()
        ));
    }
}

/// Imprime a mensagem composta (comando `preview`).
pub fn print_preview(message: &ComposedMessage) {
    let dim = Style::new().dim();
    println!("{}", dim.apply_to("─── text ───"));
    print!("{}", message.text);
    match &message.attachment {
        Some(bytes) => {
            println!("{}", dim.apply_to("─── files: log (text/plain) ───"));
            println!("{}", String::from_utf8_lossy(bytes));
        }
        None => println!("{}", dim.apply_to("─── no attachment ───")),
    }
}
