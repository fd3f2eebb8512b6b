// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! FHIR helper filters used by the resource templates

mod address;
mod code;
mod date;
mod identifier;
mod name_parts;
mod phone;
mod reference;
mod unit;

pub use address::AddressFilter;
pub use code::CodeFilter;
pub use date::{DateFilter, reformat as reformat_date, translate_pattern};
pub use identifier::{IdentifierFilter, format_ssn};
pub use name_parts::NamePartsFilter;
pub use phone::{PhoneFilter, format_phone};
pub use reference::ReferenceFilter;
pub use unit::UnitFilter;

use crate::registry::filter::FilterRegistry;
use crate::registry::tables::FilterTables;
use std::sync::Arc;

/// Register all FHIR filters over shared mapping tables
pub fn register_fhir_filters(registry: &mut FilterRegistry, tables: Arc<FilterTables>) {
    registry.register(DateFilter);
    registry.register(PhoneFilter);
    registry.register(NamePartsFilter);
    registry.register(AddressFilter);
    registry.register(IdentifierFilter::new(Arc::clone(&tables)));
    registry.register(CodeFilter::new(Arc::clone(&tables)));
    registry.register(UnitFilter::new(tables));
    registry.register(ReferenceFilter);
}
