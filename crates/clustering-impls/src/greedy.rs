//! A greedy single-link fragment clustering algorithm.

use log::debug;

use ransim_core::{
    cluster::{Cluster, ClusteringAlgo},
    frag::Fragment,
    units::Frequency,
};

use crate::feature;

/// Greedy clustering. Fragments are visited in list order; each one joins the first existing
/// cluster that has any member "close" to it, or starts a new cluster. Clusters are never
/// merged, so a fragment that bridges two clusters only joins the earlier one.
#[derive(Debug, derive_new::new)]
pub struct GreedyClustering<F, G> {
    feature: F,
    is_close_enough: G,
}

impl<F, G, X> ClusteringAlgo for GreedyClustering<F, G>
where
    F: Fn(&Fragment) -> X,
    G: Fn(&X, &X) -> bool,
{
    fn cluster(&self, fragments: &[Fragment]) -> Vec<Cluster> {
        let features = fragments
            .iter()
            .map(|f| (self.feature)(f))
            .collect::<Vec<_>>();
        // Groups of positions into `fragments`, in joining order.
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (i, feat) in features.iter().enumerate() {
            let home = groups.iter_mut().find(|group| {
                group
                    .iter()
                    .any(|&j| (self.is_close_enough)(feat, &features[j]))
            });
            match home {
                Some(group) => group.push(i),
                None => groups.push(vec![i]),
            }
        }
        let clusters = groups
            .into_iter()
            .map(|group| {
                let mut members = group.into_iter().map(|i| fragments[i].id);
                // Every group starts with the fragment that opened it.
                let mut cluster = Cluster::new(members.next().unwrap_or_default());
                for member in members {
                    cluster.push(member);
                }
                cluster
            })
            .collect::<Vec<_>>();
        debug!(
            "Clustered {} fragments into {} clusters",
            fragments.len(),
            clusters.len()
        );
        clusters
    }
}

/// Clustering by center-frequency proximity with the standard threshold.
pub fn proximity(
) -> GreedyClustering<fn(&Fragment) -> Frequency, impl Fn(&Frequency, &Frequency) -> bool + Copy>
{
    GreedyClustering::new(
        feature::center_freq as fn(&Fragment) -> Frequency,
        feature::within(feature::PROXIMITY_THRESHOLD),
    )
}

#[cfg(test)]
mod tests {
    use ransim_core::{frag, types::FragmentId, units::Bandwidth};

    use super::*;

    fn fragments_at(freqs: &[u64]) -> Vec<Fragment> {
        freqs
            .iter()
            .enumerate()
            .map(|(i, &f)| {
                Fragment::new(FragmentId::new(i), Bandwidth::new(10), Frequency::new(f))
            })
            .collect()
    }

    fn layout(clusters: &[Cluster]) -> Vec<Vec<usize>> {
        clusters
            .iter()
            .map(|c| c.members().map(|id| id.index()).collect())
            .collect()
    }

    #[derive(serde::Serialize)]
    struct Summary {
        representative: FragmentId,
        size: usize,
        capacity: Bandwidth,
    }

    #[test]
    fn reference_band_plan_clusters() {
        let fragments = frag::default_fragments();
        let clusters = proximity().cluster(&fragments);
        let summary = clusters
            .iter()
            .map(|c| Summary {
                representative: c.representative(),
                size: c.len(),
                capacity: c.members().map(|id| fragments[id.index()].nominal).sum(),
            })
            .collect::<Vec<_>>();
        insta::assert_yaml_snapshot!(summary, @r###"
        ---
        - representative: 0
          size: 2
          capacity: 90
        - representative: 2
          size: 1
          capacity: 30
        - representative: 3
          size: 1
          capacity: 35
        "###);
    }

    struct CaptureLogger;

    static RECORDS: std::sync::Mutex<Vec<(log::Level, String)>> =
        std::sync::Mutex::new(Vec::new());

    impl log::Log for CaptureLogger {
        fn enabled(&self, _: &log::Metadata<'_>) -> bool {
            true
        }

        fn log(&self, record: &log::Record<'_>) {
            if record.target() == "clustering_impls::greedy" {
                if let Ok(mut records) = RECORDS.lock() {
                    records.push((record.level(), record.args().to_string()));
                }
            }
        }

        fn flush(&self) {}
    }

    // Clustering runs once per slot, so it must stay below the info level.
    #[test]
    fn clustering_logs_at_debug() {
        static LOGGER: CaptureLogger = CaptureLogger;
        log::set_logger(&LOGGER).unwrap();
        log::set_max_level(log::LevelFilter::Trace);

        proximity().cluster(&frag::default_fragments());

        let records = RECORDS.lock().unwrap();
        assert!(records
            .iter()
            .any(|(level, msg)| *level == log::Level::Debug && msg.contains("into 3 clusters")));
        assert!(records.iter().all(|(level, _)| *level > log::Level::Info));
    }

    #[test]
    fn links_chain_through_neighbours() {
        let clusters = proximity().cluster(&fragments_at(&[100, 200, 300]));
        assert_eq!(layout(&clusters), vec![vec![0, 1, 2]]);
    }

    #[test]
    fn first_matching_cluster_wins() {
        // 100 is close to both existing clusters but only joins the first.
        let clusters = proximity().cluster(&fragments_at(&[0, 200, 100]));
        assert_eq!(layout(&clusters), vec![vec![0, 2], vec![1]]);
    }

    #[test]
    fn threshold_distance_starts_a_new_cluster() {
        let clusters = proximity().cluster(&fragments_at(&[0, 300, 150]));
        assert_eq!(layout(&clusters), vec![vec![0], vec![1], vec![2]]);
    }

    #[test]
    fn custom_features() {
        // Cluster by capacity instead: everything at 10 units lands together.
        let by_capacity = GreedyClustering::new(
            |f: &Fragment| f.nominal,
            |a: &Bandwidth, b: &Bandwidth| a == b,
        );
        let clusters = by_capacity.cluster(&fragments_at(&[0, 5000, 9000]));
        assert_eq!(clusters.len(), 1);
        assert!(proximity().cluster(&[]).is_empty());
    }
}
