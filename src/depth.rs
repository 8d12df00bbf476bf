#[allow(unused_imports)]
use crate::Avl;

/// Depth calculates minimum, maximum, average and percentile of leaf-node
/// depths in the [`Avl`] tree. Depth is counted in edges from the root,
/// root alone has depth 0.
#[derive(Clone, Debug)]
pub struct Depth {
    samples: usize,
    min: Option<usize>,
    max: usize,
    total: usize,
    depths: [u64; 256],
}

impl Depth {
    pub(crate) fn new() -> Depth {
        Default::default()
    }

    pub(crate) fn sample(&mut self, depth: usize) {
        self.samples += 1;
        self.total += depth;
        self.min = Some(self.min.map_or(depth, |min| min.min(depth)));
        self.max = self.max.max(depth);
        // AVL height is logarithmic, saturate instead of growing the table.
        self.depths[depth.min(255)] += 1;
    }

    /// Return number of leaf-nodes sampled in [`Avl`] instance.
    pub fn samples(&self) -> usize {
        self.samples
    }

    /// Return minimum depth of leaf-node in [`Avl`] instance.
    pub fn min(&self) -> usize {
        self.min.unwrap_or(0)
    }

    /// Return maximum depth of leaf-node in [`Avl`] instance.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Return the average depth of leaf-nodes in [`Avl`] instance.
    pub fn mean(&self) -> usize {
        match self.samples {
            0 => 0,
            n => self.total / n,
        }
    }

    /// Return depth as tuple of percentiles, each tuple provides
    /// (percentile, depth). Returned percentiles from 90, 91 .. 100
    pub fn percentiles(&self) -> Vec<(u8, usize)> {
        let mut percentiles: Vec<(u8, usize)> = vec![];
        if self.samples == 0 {
            return percentiles;
        }
        let (mut acc, mut prev_perc) = (0_u64, 90_u8);
        let iter = self.depths.iter().enumerate().filter(|(_, &item)| item > 0);
        for (depth, samples) in iter {
            acc += *samples;
            let perc = ((acc as f64 / self.samples as f64) * 100_f64) as u8;
            if perc >= prev_perc {
                percentiles.push((perc, depth));
                prev_perc = perc;
            }
        }
        percentiles
    }

    /// Log depth statistics in human readable format, at INFO level.
    pub fn pretty_print(&self, prefix: &str) {
        tracing::info!(
            "{}depth (min, avg, max): {:?}",
            prefix,
            (self.min(), self.mean(), self.max)
        );
        for (perc, depth) in self.percentiles().into_iter() {
            tracing::info!("{}  {} percentile = {}", prefix, perc, depth);
        }
    }

    /// Convert depth statistics to JSON format, useful for plotting.
    pub fn json(&self) -> String {
        let ps: Vec<String> = self
            .percentiles()
            .into_iter()
            .map(|(p, d)| format!("\"{}\": {}", p, d))
            .collect();
        let strs = [
            format!("\"samples\": {}", self.samples),
            format!("\"min\": {}", self.min()),
            format!("\"mean\": {}", self.mean()),
            format!("\"max\": {}", self.max),
            format!("\"percentiles\": {{ {} }}", ps.join(", ")),
        ];
        format!("{{ {} }}", strs.join(", "))
    }
}

impl Default for Depth {
    fn default() -> Self {
        Depth {
            samples: 0,
            min: None,
            max: 0,
            total: 0,
            depths: [0; 256],
        }
    }
}
