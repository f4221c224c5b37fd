//! Formatted terminal output.
//!
//! We keep formatting code in one place so:
//! - the simulation/estimation code stays clean and testable
//! - output changes are localized

use crate::app::pipeline::EvaluationOutput;
use crate::domain::{SimConfig, SimParams, SimulationOutput};
use crate::fit::ObservedFit;
use crate::loss::ThreadLoss;

/// Format the header shared by `simulate` and `evaluate`.
pub fn format_simulation_summary(sim: &SimulationOutput, params: &SimParams, config: &SimConfig) -> String {
    let mut out = String::new();

    out.push_str("=== convsim - conversation simulation ===\n");
    out.push_str(&format!("Model: {}\n", config.model.display_name()));
    let cap = config
        .max_users
        .map_or_else(|| "none".to_string(), |cap| cap.to_string());
    out.push_str(&format!(
        "Threads: {} | min_users={} | max_users={} | seed={}\n",
        sim.threads.len(),
        config.min_users,
        cap,
        config.seed
    ));
    out.push_str(&format!(
        "Events: simulated={} | observed={}\n",
        sim.simulated.len(),
        sim.observed.len()
    ));

    out.push_str("\nParameters:\n");
    out.push_str(&format!("- users    : gamma={:.4}\n", params.gamma));
    out.push_str(&format!(
        "- initial  : beta(a={:.4}, b={:.4}, loc={:.4}, scale={:.4})\n",
        params.a, params.b, params.loc, params.scale
    ));
    out.push_str(&format!(
        "- comments : alpha={:.4}, lambda={:.4}\n",
        params.alpha, params.lambda
    ));
    out.push_str(&format!(
        "- gaps     : burr(c={:.4}, d={:.4}, l={:.4}, s={:.4})\n",
        params.c, params.d, params.l, params.s
    ));
    out.push_str(&format!(
        "- final gap: burr(c={:.4}, d={:.4}, l={:.4}, s={:.4})\n",
        params.cf, params.df, params.lf, params.sf
    ));
    out.push_str(&format!(
        "- rank     : beta(a={:.4}, b={:.4}, loc={:.4}, scale={:.4})\n",
        params.ka, params.kb, params.kloc, params.kscale
    ));

    out
}

/// Format the full evaluation summary (simulation header + loss + worst threads).
pub fn format_evaluation(run: &EvaluationOutput, params: &SimParams, config: &SimConfig, top_n: usize) -> String {
    let mut out = format_simulation_summary(&run.simulation, params, config);

    out.push_str("\nECDF:\n");
    out.push_str(&format!(
        "- rows: simulated={} | observed={}\n",
        run.sim_ecdf.len(),
        run.obs_ecdf.len()
    ));
    out.push_str(&format!(
        "- joined={} | unmatched simulated={} | unmatched observed={}\n",
        run.loss.joined_rows, run.loss.unmatched_simulated, run.loss.unmatched_observed
    ));
    out.push_str(&format!("\nLoss: {:.6}\n", run.loss.loss));

    if top_n > 0 && !run.thread_losses.is_empty() {
        out.push_str(&format!("\nWorst-fitting threads (top {top_n}):\n"));
        out.push_str(&format_thread_table(&run.thread_losses, top_n));
    }

    out
}

/// Format the per-thread loss table.
pub fn format_thread_table(rows: &[ThreadLoss], top_n: usize) -> String {
    let mut out = String::new();
    out.push_str(format!("{:<24} {:>12} {:>8}", "post_id", "loss", "rows").trim_end());
    out.push('\n');
    out.push_str(format!("{:-<24} {:-<12} {:-<8}", "", "", "").trim_end());
    out.push('\n');

    for r in rows.iter().take(top_n) {
        out.push_str(&format!(
            "{:<24} {:>12.6} {:>8}\n",
            truncate(&r.post_id, 24),
            r.loss,
            r.joined_rows
        ));
    }

    out
}

/// Format fitted observed parameters.
pub fn format_observed_fit(fit: &ObservedFit) -> String {
    let mut out = String::new();
    out.push_str("=== convsim - observed fit ===\n");
    out.push_str(&format!(
        "Inputs: threads={} | first comments={}\n",
        fit.threads, fit.first_comments
    ));
    out.push_str(&format!("- gamma  : {:.6}\n", fit.gamma));
    let b = &fit.initial_comment;
    out.push_str(&format!(
        "- initial: beta(a={:.6}, b={:.6}, loc={:.6}, scale={:.6})\n",
        b.a, b.b, b.loc, b.scale
    ));
    out
}

/// Shorten long thread ids to `max` characters, marking the cut with a dot.
fn truncate(id: &str, max: usize) -> String {
    match id.char_indices().nth(max) {
        None => id.to_string(),
        Some(_) => {
            let keep = max.saturating_sub(1);
            let mut short: String = id.chars().take(keep).collect();
            short.push('.');
            short
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thread_table_respects_top_n() {
        let rows = vec![
            ThreadLoss {
                post_id: "P1".to_string(),
                loss: 2.0,
                joined_rows: 10,
            },
            ThreadLoss {
                post_id: "P2".to_string(),
                loss: 1.0,
                joined_rows: 10,
            },
        ];
        let table = format_thread_table(&rows, 1);
        assert!(table.contains("P1"));
        assert!(!table.contains("P2"));
        assert_eq!(table.lines().count(), 3);
    }

    #[test]
    fn truncate_marks_long_ids() {
        assert_eq!(truncate("abcdef", 4), "abc.");
        assert_eq!(truncate("abc", 4), "abc");
        assert_eq!(truncate("abcd", 4), "abcd");
        assert_eq!(truncate("ümlaut-thread", 3), "üm.");
    }
}
