// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 flowline contributors

//! Portable-document re-emitter
//!
//! Identity transform producing the canonical specification bytes; used for
//! interchange and for testing the serialization contract.

use crate::errors::FlowlineResult;
use crate::spec::FlowSpec;

pub(crate) fn render(spec: &FlowSpec) -> FlowlineResult<String> {
    spec.to_json()
}

#[cfg(test)]
mod tests {
    use crate::export::tests::{fixed_now, make_spec, make_step};
    use crate::export::{export, ExportTarget};
    use crate::flow::ComponentType;
    use crate::spec::FlowSpec;

    #[test]
    fn test_document_target_is_the_identity_transform() {
        let spec = make_spec(
            vec![make_step(0, "ingest", ComponentType::Loader, None)],
            vec![],
        );

        let artifact = export(&spec, ExportTarget::Document, fixed_now()).unwrap();
        assert_eq!(artifact.content, spec.to_json().unwrap());

        let reloaded = FlowSpec::from_json(&artifact.content).unwrap();
        assert_eq!(reloaded, spec);
    }
}
