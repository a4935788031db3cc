/// Pairwise potential parameters between two particle types.
#[derive(Debug, Clone, PartialEq)]
pub struct Interaction {
    pub p1_label: String,
    pub p2_label: String,
    pub epsilon: f64,
    pub sigma: f64,
    pub alpha: f64,
}

impl Interaction {
    pub fn new(
        p1_label: impl Into<String>,
        p2_label: impl Into<String>,
        epsilon: f64,
        sigma: f64,
        alpha: f64,
    ) -> Self {
        Self {
            p1_label: p1_label.into(),
            p2_label: p2_label.into(),
            epsilon,
            sigma,
            alpha,
        }
    }

    /// Registry key of the pair, `"{p1}-{p2}"`.
    pub fn label(&self) -> String {
        format!("{}-{}", self.p1_label, self.p2_label)
    }

    /// Expands one declaration with several partners into one interaction per partner.
    pub fn fan_out<'a>(
        p1_label: &'a str,
        partners: &'a [String],
        epsilon: f64,
        sigma: f64,
        alpha: f64,
    ) -> impl Iterator<Item = Interaction> + 'a {
        partners
            .iter()
            .map(move |p2| Interaction::new(p1_label, p2.as_str(), epsilon, sigma, alpha))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fan_out_creates_one_interaction_per_partner() {
        let partners = vec!["B".to_string(), "C".to_string()];
        let out: Vec<_> = Interaction::fan_out("A", &partners, 1.0, 2.0, 0.5).collect();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0], Interaction::new("A", "B", 1.0, 2.0, 0.5));
        assert_eq!(out[1].label(), "A-C");
    }
}
