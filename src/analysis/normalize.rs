//! Normalización del historial de repostajes
//!
//! El orden de llegada no significa nada: la única secuencia válida para
//! calcular distancias es la cronológica.

use crate::models::FuelLogEntry;

/// Ordena por `date_time` ascendente sin tocar la entrada original.
/// El sort es estable, así que los empates conservan el orden de llegada.
pub fn sort_chronologically(entries: &[FuelLogEntry]) -> Vec<&FuelLogEntry> {
    let mut sorted: Vec<&FuelLogEntry> = entries.iter().collect();
    sorted.sort_by(|a, b| a.date_time.cmp(&b.date_time));
    sorted
}

/// Orden total por `(date_time, id)`. Las sumas se hacen en este orden para
/// que los empates de fecha no cambien los totales.
pub fn canonical_order<'a>(entries: &[&'a FuelLogEntry]) -> Vec<&'a FuelLogEntry> {
    let mut ordered = entries.to_vec();
    ordered.sort_by(|a, b| a.date_time.cmp(&b.date_time).then(a.id.cmp(&b.id)));
    ordered
}
