use crate::config::Config;
use crate::io::fetch_basis;
use ::basis::basis::AOBasis;
use ::basis::cgto::AtomicBasis;
use color_eyre::eyre::Result;
use periodic_table_on_an_enum::Element;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;
use tracing::info;

pub type BasisMap<B> = HashMap<&'static str, Arc<B>>;

pub const DEFAULT_BASIS: &str = "sto-3g";

/// Loader trait that can be implemented for any atomic-orbital basis family.
pub trait BasisLoader<B: AOBasis> {
    fn load(&self, element: &Element, requested: Option<&str>) -> Result<B>;
}

/// Loads NWChem-format basis sets: bundled STO-3G, local files or the
/// Basis Set Exchange.
pub struct NwchemLoader {
    pub default_basis: String,
}

impl Default for NwchemLoader {
    fn default() -> Self {
        NwchemLoader {
            default_basis: DEFAULT_BASIS.to_string(),
        }
    }
}

impl BasisLoader<AtomicBasis> for NwchemLoader {
    fn load(&self, element: &Element, requested: Option<&str>) -> Result<AtomicBasis> {
        let name = requested.unwrap_or(&self.default_basis);
        fetch_basis(element.get_symbol(), name)
    }
}

/// Registry that caches loaded basis functions per element.
pub struct BasisRegistry<B: AOBasis, L: BasisLoader<B>> {
    loader: L,
    cache: BasisMap<B>,
    _marker: PhantomData<B>,
}

impl<B: AOBasis, L: BasisLoader<B>> BasisRegistry<B, L> {
    pub fn new(loader: L) -> Self {
        Self {
            loader,
            cache: HashMap::new(),
            _marker: PhantomData,
        }
    }

    pub fn num_cached(&self) -> usize {
        self.cache.len()
    }

    pub fn load_for_elements(
        &mut self,
        config: &Config,
        elements: &[Element],
    ) -> Result<BasisMap<B>> {
        for element in elements {
            let symbol = element.get_symbol();
            if self.cache.contains_key(symbol) {
                continue;
            }

            let requested = config.basis_sets.get(symbol).map(|s| s.as_str());
            if let Some(name) = requested {
                info!("Loading {} basis for {}", name, symbol);
            } else {
                info!("Loading default basis for {}", symbol);
            }

            let basis = self.loader.load(element, requested)?;
            self.cache.insert(symbol, Arc::new(basis));
        }

        Ok(elements
            .iter()
            .filter_map(|e| {
                let symbol = e.get_symbol();
                self.cache.get(symbol).map(|b| (symbol, Arc::clone(b)))
            })
            .collect())
    }
}
