//! Interface de terminal: spinner durante a busca e resultado colorido.
//!
//! Usa `indicatif` para o spinner de progresso e `console` para cores.
//! O spinner escreve em stderr, então a tabela em stdout continua limpa
//! quando redirecionada para um arquivo.

use std::time::Duration;

use console::Style;
use indicatif::{ProgressBar, ProgressStyle};

use crate::orchestrator::RunOutcome;
use crate::pce::Inventory;

/// Indicador visual enquanto o inventário é buscado.
pub struct FetchProgress {
    pb: ProgressBar,
    green: Style,
    yellow: Style,
}

impl FetchProgress {
    /// Inicia o spinner com a origem dos workloads.
    pub fn start(origin: &str) -> Self {
        let pb = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
            pb.set_style(style);
        }
        pb.set_message(format!("Fetching workloads from {origin}"));
        pb.enable_steady_tick(Duration::from_millis(100));

        Self {
            pb,
            green: Style::new().green().bold(),
            yellow: Style::new().yellow(),
        }
    }

    /// Para o spinner e mostra quantos workloads chegaram.
    pub fn finish(&self, inventory: &Inventory) {
        self.pb.finish_and_clear();
        let count = inventory.workloads.len();
        if inventory.complete {
            eprintln!(
                "  {} Retrieved {count} workloads ({} pages)",
                self.green.apply_to("✓"),
                inventory.pages
            );
        } else {
            eprintln!(
                "  {} Retrieved {count} workloads, inventory incomplete",
                self.yellow.apply_to("!")
            );
        }
    }

    /// Para o spinner sem mensagem (falha na busca).
    pub fn abandon(&self) {
        self.pb.finish_and_clear();
    }
}

/// Linha final com o resultado do relatório.
pub fn print_outcome(outcome: &RunOutcome) {
    let green = Style::new().green().bold();
    let yellow = Style::new().yellow();

    match outcome {
        RunOutcome::NoWorkloads { complete: true } => {
            eprintln!("  {} Nothing to report", yellow.apply_to("!"));
        }
        RunOutcome::NoWorkloads { complete: false } => {
            eprintln!(
                "  {} Nothing to report, inventory incomplete",
                yellow.apply_to("!")
            );
        }
        RunOutcome::Written {
            path,
            rows,
            skipped,
            complete,
        } => {
            eprintln!(
                "  {} Wrote {rows} rows to {}",
                green.apply_to("✓"),
                path.display()
            );
            if *skipped > 0 {
                eprintln!(
                    "  {} {skipped} workloads skipped (see warnings above)",
                    yellow.apply_to("!")
                );
            }
            if !complete {
                eprintln!(
                    "  {} Report covers a partial inventory",
                    yellow.apply_to("!")
                );
            }
        }
    }
}

/// Mensagem de erro fatal em vermelho.
pub fn print_failure(message: &str) {
    eprintln!("  {} {message}", Style::new().red().bold().apply_to("✗"));
}
