use std::cmp::Ordering;

use itertools::Itertools;
use strum::IntoEnumIterator;

use crate::{catalog::GalaxyCatalog, settings::SimulationId};

/// Selection masks of a single simulation
///
/// The three masks are disjoint and together cover every galaxy of the
/// simulation: `fiducial` passes the stringent cuts, `borderline` passes
/// only the lenient ones and `field` fails both.
#[derive(Debug)]
pub struct SimSelection {
    pub sim_id: SimulationId,
    pub fiducial: Vec<bool>,
    pub borderline: Vec<bool>,
    pub field: Vec<bool>,
}
impl SimSelection {
    pub fn new(catalog: &GalaxyCatalog, sim_id: SimulationId) -> Self {
        let id = catalog.id_mask(sim_id);
        let fiducial = id
            .iter()
            .zip(catalog.reff2_mu2.iter())
            .map(|(&id, &udg)| id && udg)
            .collect();
        let borderline = id
            .iter()
            .zip(catalog.reff1_mu1.iter().zip(catalog.reff2_mu2.iter()))
            .map(|(&id, (&lenient, &fiducial))| id && lenient && !fiducial)
            .collect();
        let field = id
            .iter()
            .zip(catalog.reff1_mu1.iter())
            .map(|(&id, &lenient)| id && !lenient)
            .collect();
        Self {
            sim_id,
            fiducial,
            borderline,
            field,
        }
    }
}

/// Galaxy totals of the four threshold combinations of a simulation
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SelectionCounts {
    pub reff1_mu1: usize,
    pub reff1_mu2: usize,
    pub reff2_mu1: usize,
    pub reff2_mu2: usize,
}
impl SelectionCounts {
    pub fn new(catalog: &GalaxyCatalog, sim_id: SimulationId) -> Self {
        let id = catalog.id_mask(sim_id);
        let count = |flags: &[bool]| {
            id.iter()
                .zip(flags.iter())
                .filter(|(&id, &flag)| id && flag)
                .count()
        };
        Self {
            reff1_mu1: count(&catalog.reff1_mu1),
            reff1_mu2: count(&catalog.reff1_mu2),
            reff2_mu1: count(&catalog.reff2_mu1),
            reff2_mu2: count(&catalog.reff2_mu2),
        }
    }
}

/// Prints the per-simulation UDG totals
pub fn print_counts(catalog: &GalaxyCatalog) {
    println!();
    println!("N_UDG,tot");
    println!("##############");
    for sim_id in SimulationId::iter() {
        let counts = SelectionCounts::new(catalog, sim_id);
        println!("{}", sim_id);
        println!("Reff1, Mu1: {}", counts.reff1_mu1);
        println!("Reff1, Mu2: {}", counts.reff1_mu2);
        println!("Reff2, Mu1: {}", counts.reff2_mu1);
        println!("Reff2, Mu2: {}", counts.reff2_mu2);
        println!("##############");
    }
}

/// Galaxy draw order: ascending nearest-host distance, missing distances last
pub fn argsort_by_distance(dist: &[Option<f64>]) -> Vec<usize> {
    (0..dist.len())
        .sorted_by(|&i, &j| match (dist[i], dist[j]) {
            (Some(a), Some(b)) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::tests::catalog;

    #[test]
    fn fiducial_is_subset_of_lenient() {
        let catalog = catalog();
        for sim_id in SimulationId::iter() {
            let selection = SimSelection::new(&catalog, sim_id);
            let lenient: Vec<bool> = catalog
                .id_mask(sim_id)
                .iter()
                .zip(catalog.reff1_mu1.iter())
                .map(|(&id, &udg)| id && udg)
                .collect();
            for (fiducial, lenient) in selection.fiducial.iter().zip(lenient.iter()) {
                assert!(!fiducial | lenient);
            }
        }
    }

    #[test]
    fn masks_partition_the_simulation() {
        let catalog = catalog();
        for sim_id in SimulationId::iter() {
            let selection = SimSelection::new(&catalog, sim_id);
            let id = catalog.id_mask(sim_id);
            for k in 0..catalog.len() {
                let layers = [
                    selection.fiducial[k],
                    selection.borderline[k],
                    selection.field[k],
                ];
                assert_eq!(
                    layers.iter().filter(|&&m| m).count(),
                    usize::from(id[k]),
                    "galaxy {} of {}",
                    k,
                    sim_id
                );
            }
        }
    }

    #[test]
    fn counts() {
        let catalog = catalog();
        assert_eq!(
            SelectionCounts::new(&catalog, SimulationId::Lg0918),
            SelectionCounts {
                reff1_mu1: 2,
                reff1_mu2: 1,
                reff2_mu1: 1,
                reff2_mu2: 1,
            }
        );
    }

    #[test]
    fn draw_order() {
        let dist = vec![Some(350.), None, Some(120.), Some(1500.)];
        assert_eq!(argsort_by_distance(&dist), vec![2, 0, 3, 1]);
    }
}
