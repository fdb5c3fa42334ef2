//! Head-to-head fixture summary
//!
//! Folds per-match result rows into the aggregate reported by the
//! historical-data endpoint.

use crate::data::database::HeadToHeadMatch;

/// Aggregated head-to-head statistics between two teams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadToHeadSummary {
    pub total_partidos: i64,
    pub posesion_local_promedio: f64,
    pub posesion_visitante_promedio: f64,
    pub corners_promedio: f64,
    pub goles_promedio: f64,
    pub tarjetas_promedio: f64,
    pub victorias_local: i64,
    pub victorias_visitante: i64,
    pub empates: i64,
}

impl HeadToHeadSummary {
    /// Fold per-match rows into the summary. Returns `None` when there is no
    /// history. Possession is stored as a 0-1 fraction and reported as a
    /// percentage; corners, goals and cards are per-team averages, so the
    /// summed totals divide by twice the match count.
    pub fn from_matches(matches: &[HeadToHeadMatch]) -> Option<Self> {
        if matches.is_empty() {
            return None;
        }

        let mut summary = HeadToHeadSummary::default();
        let mut posesion_local = 0.0;
        let mut posesion_visitante = 0.0;
        let mut corners = 0.0;
        let mut goles = 0.0;
        let mut tarjetas = 0.0;

        for m in matches {
            posesion_local += m.posesion_local * 100.0;
            posesion_visitante += m.posesion_visitante * 100.0;
            corners += m.corners_local + m.corners_visitante;
            goles += m.goles_local + m.goles_visitante;
            tarjetas += m.tarjetas_totales;

            match m.resultado_1x2 {
                1 => summary.victorias_local += 1,
                2 => summary.victorias_visitante += 1,
                _ => summary.empates += 1,
            }
        }

        let n = matches.len() as f64;
        summary.total_partidos = matches.len() as i64;
        summary.posesion_local_promedio = posesion_local / n;
        summary.posesion_visitante_promedio = posesion_visitante / n;
        summary.corners_promedio = corners / (n * 2.0);
        summary.goles_promedio = goles / (n * 2.0);
        summary.tarjetas_promedio = tarjetas / (n * 2.0);
        Some(summary)
    }
}
