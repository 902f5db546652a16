use dtsguard_core::{Program, Symbol};
use log::{debug, trace};

use crate::error::{PublicApiError, Result};

/// Replaces every alias among `exports` by the symbol it denotes.
///
/// Aliases whose target has no declaration in the loaded files (re-exports
/// of package modules, namespaces, missing names) are kept as they are. An
/// alias that resolves to a symbol of another name is an error.
pub fn resolve_exports<'p>(program: &'p Program, exports: Vec<&'p Symbol>) -> Result<Vec<&'p Symbol>> {
    exports
        .into_iter()
        .map(|symbol| {
            if !symbol.is_alias() {
                return Ok(symbol);
            }
            match program.resolve_alias(symbol) {
                Some(target) if !target.declarations.is_empty() => {
                    if target.name != symbol.name {
                        return Err(PublicApiError::AliasRenamed {
                            alias: symbol.name.clone(),
                            target: target.name.clone(),
                        });
                    }
                    trace!("Resolved alias '{}'", symbol.name);
                    Ok(target)
                }
                _ => {
                    debug!("Keeping unresolved alias '{}'", symbol.name);
                    Ok(symbol)
                }
            }
        })
        .collect()
}
