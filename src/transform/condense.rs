use tracing::{debug, info};

use crate::entities::drug::{ApplicationType, DrugRecord, GenericForm};

/// Folds abbreviated-application records into the unprotected brand record
/// with the same ingredients, dosage form/route, and strength.
///
/// Works over a fixed snapshot: absorbed generics are marked, then the
/// surviving list is rebuilt in original order. Returns the list and the
/// number of generics absorbed.
pub fn condense_generics(drugs: Vec<DrugRecord>) -> (Vec<DrugRecord>, usize) {
    let mut absorbed = vec![false; drugs.len()];
    let mut forms: Vec<Vec<GenericForm>> = vec![Vec::new(); drugs.len()];

    for (brand_idx, brand) in drugs.iter().enumerate() {
        if brand.application_type != ApplicationType::New || !brand.is_unprotected() {
            continue;
        }
        for (other_idx, other) in drugs.iter().enumerate() {
            if absorbed[other_idx]
                || other.application_type != ApplicationType::Abbreviated
                || !brand.is_same_product_as(other)
            {
                continue;
            }
            debug!(
                brand = %brand.trade_name,
                generic_applicant = %other.applicant,
                "absorbing generic form"
            );
            forms[brand_idx].push(GenericForm {
                applicant: other.applicant.clone(),
                applicant_full_name: other.applicant_full_name.clone(),
                approval_date: other.approval_date,
                market_status: other.market_status.clone(),
            });
            absorbed[other_idx] = true;
        }
    }

    let absorbed_count = absorbed.iter().filter(|&&gone| gone).count();
    let condensed: Vec<DrugRecord> = drugs
        .into_iter()
        .zip(absorbed)
        .zip(forms)
        .filter_map(|((mut drug, gone), generic_forms)| {
            if gone {
                return None;
            }
            drug.generic_forms.extend(generic_forms);
            Some(drug)
        })
        .collect();

    info!(
        absorbed = absorbed_count,
        remaining = condensed.len(),
        "generic condensing done"
    );
    (condensed, absorbed_count)
}
