use crate::config::Config;
use color_eyre::eyre::{eyre, Result};
use nalgebra::Vector3;
use periodic_table_on_an_enum::Element;
use tracing::info;

/// Geometry information (elements and coordinates in bohr) prepared from the
/// user configuration.
pub struct Geometry {
    pub elements: Vec<Element>,
    pub coords: Vec<Vector3<f64>>,
}

/// Build the molecular geometry defined in the YAML configuration.
///
/// With `bond_length` (in the configured units) the last atom is moved along
/// its current direction from the first atom, or along +z when both coincide.
pub fn build_geometry(config: &Config, bond_length: Option<f64>) -> Result<Geometry> {
    info!("\nPreparing geometry...");
    let to_bohr = config.length_unit()?.to_bohr();

    let mut elements = Vec::with_capacity(config.geometry.len());
    let mut coords = Vec::with_capacity(config.geometry.len());

    for atom in &config.geometry {
        let element = Element::from_symbol(&atom.element)
            .ok_or_else(|| eyre!("Invalid element symbol: {}", atom.element))?;
        let vector = Vector3::new(atom.coords[0], atom.coords[1], atom.coords[2]) * to_bohr;
        elements.push(element);
        coords.push(vector);
    }

    if elements.is_empty() {
        return Err(eyre!("The geometry contains no atoms"));
    }

    if let Some(length) = bond_length {
        if coords.len() < 2 {
            return Err(eyre!("A bond length needs at least two atoms"));
        }
        if length <= 0.0 {
            return Err(eyre!("Bond length must be positive, got {}", length));
        }
        let origin = coords[0];
        let last = coords.len() - 1;
        let axis = (coords[last] - origin)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::z);
        coords[last] = origin + axis * (length * to_bohr);
    }

    for (elem, coord) in elements.iter().zip(coords.iter()) {
        info!(
            "  {:>2} [{:12.6}, {:12.6}, {:12.6}] bohr",
            elem.get_symbol(),
            coord.x,
            coord.y,
            coord.z
        );
    }

    Ok(Geometry { elements, coords })
}
