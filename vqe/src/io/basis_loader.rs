//! Basis set loading utilities

use basis::cgto::AtomicBasis;
use basis::library::sto3g;
use color_eyre::eyre::{Result, WrapErr};
use std::fs;
use std::path::Path;
use tracing::info;

/// Fetch a basis set for one element.
///
/// STO-3G is read from the bundled library; other names are looked up in
/// `tests/basis_sets/<name>.<symbol>.nwchem` first and then fetched from the
/// Basis Set Exchange.
pub fn fetch_basis(atomic_symbol: &str, basis_name: &str) -> Result<AtomicBasis> {
    let name = basis_name.to_lowercase();

    if name == "sto-3g" {
        if let Some(text) = sto3g(atomic_symbol) {
            return AtomicBasis::parse_nwchem(text)
                .wrap_err_with(|| format!("Bundled STO-3G data for {} is invalid", atomic_symbol));
        }
    }

    let local_path = format!(
        "tests/basis_sets/{}.{}.nwchem",
        name,
        atomic_symbol.to_lowercase()
    );
    if Path::new(&local_path).exists() {
        info!("Loading basis from local file: {}", local_path);
        let basis_str = fs::read_to_string(&local_path)
            .wrap_err_with(|| format!("Failed to read local basis set file: {}", local_path))?;
        return AtomicBasis::parse_nwchem(&basis_str)
            .wrap_err_with(|| format!("Failed to parse {}", local_path));
    }

    let url = format!(
        "https://www.basissetexchange.org/api/basis/{}/format/nwchem?elements={}",
        name, atomic_symbol
    );
    info!("Fetching basis from {}", url);
    let response = reqwest::blocking::get(&url)
        .and_then(|r| r.error_for_status())
        .wrap_err_with(|| format!("Failed to fetch basis set for {}", atomic_symbol))?;
    let basis_str = response
        .text()
        .wrap_err("Failed to get response text from basis set API")?;
    AtomicBasis::parse_nwchem(&basis_str)
        .wrap_err_with(|| format!("Failed to parse {} basis for {}", name, atomic_symbol))
}
