/*!
# Measures

Числовые метрики, накапливаемые на узлах дерева ресурсов.

Каждый вид метрики знает свой способ свертки вверх по дереву:
счетчики складываются, плотности сворачиваются взвешенным средним.
*/

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Виды метрик.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeasureKind {
    Files,
    Classes,
    Functions,
    Lines,
    CommentLines,
    Violations,
    CommentDensity,
}

/// Способ свертки метрики от детей к родителю.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregation {
    /// Сумма значений
    Sum,
    /// Среднее, взвешенное указанной метрикой
    WeightedAverage { weight: MeasureKind },
}

impl MeasureKind {
    pub fn all() -> [MeasureKind; 7] {
        [
            MeasureKind::Files,
            MeasureKind::Classes,
            MeasureKind::Functions,
            MeasureKind::Lines,
            MeasureKind::CommentLines,
            MeasureKind::Violations,
            MeasureKind::CommentDensity,
        ]
    }

    pub fn aggregation(&self) -> Aggregation {
        match self {
            MeasureKind::CommentDensity => Aggregation::WeightedAverage {
                weight: MeasureKind::Lines,
            },
            _ => Aggregation::Sum,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasureKind::Files => "files",
            MeasureKind::Classes => "classes",
            MeasureKind::Functions => "functions",
            MeasureKind::Lines => "lines",
            MeasureKind::CommentLines => "comment_lines",
            MeasureKind::Violations => "violations",
            MeasureKind::CommentDensity => "comment_density",
        }
    }
}

impl fmt::Display for MeasureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Набор метрик одного узла дерева.
///
/// Хранятся только присутствующие метрики: отсутствие значения и
/// нулевое значение различаются при свертке взвешенных средних.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measures {
    values: BTreeMap<MeasureKind, f64>,
}

impl Measures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, kind: MeasureKind) -> Option<f64> {
        self.values.get(&kind).copied()
    }

    pub fn set(&mut self, kind: MeasureKind, value: f64) {
        self.values.insert(kind, value);
    }

    /// Увеличивает метрику на значение, создавая ее при отсутствии.
    pub fn add(&mut self, kind: MeasureKind, delta: f64) {
        *self.values.entry(kind).or_insert(0.0) += delta;
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (MeasureKind, f64)> + '_ {
        self.values.iter().map(|(k, v)| (*k, *v))
    }

    /// Сворачивает метрики детей в этот набор.
    ///
    /// Счетчики складываются с собственным значением узла. Взвешенные
    /// средние считаются по парам (значение, вес), где собственное
    /// значение узла участвует со своим весом до свертки.
    pub fn add_measures(&mut self, children: &[&Measures]) {
        let own = self.values.clone();

        for kind in MeasureKind::all() {
            match kind.aggregation() {
                Aggregation::Sum => {
                    let mut total = 0.0;
                    let mut present = false;
                    if let Some(value) = own.get(&kind) {
                        total += value;
                        present = true;
                    }
                    for child in children {
                        if let Some(value) = child.get(kind) {
                            total += value;
                            present = true;
                        }
                    }
                    if present {
                        self.values.insert(kind, total);
                    }
                }
                Aggregation::WeightedAverage { weight } => {
                    let mut numerator = 0.0;
                    let mut denominator = 0.0;
                    if let (Some(value), Some(w)) = (own.get(&kind), own.get(&weight)) {
                        numerator += value * w;
                        denominator += w;
                    }
                    for child in children {
                        if let (Some(value), Some(w)) = (child.get(kind), child.get(weight)) {
                            numerator += value * w;
                            denominator += w;
                        }
                    }
                    if denominator > 0.0 {
                        self.values.insert(kind, numerator / denominator);
                    }
                }
            }
        }
    }
}

impl fmt::Display for Measures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (kind, value) in &self.values {
            if !first {
                write!(f, " ")?;
            }
            first = false;
            if value.fract() == 0.0 {
                write!(f, "{}={}", kind, *value as i64)?;
            } else {
                write!(f, "{}={:.2}", kind, value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sum_aggregation() {
        let mut parent = Measures::new();
        parent.set(MeasureKind::Files, 1.0);

        let mut a = Measures::new();
        a.set(MeasureKind::Files, 2.0);
        let mut b = Measures::new();
        b.set(MeasureKind::Files, 3.0);

        parent.add_measures(&[&a, &b]);
        assert_eq!(parent.get(MeasureKind::Files), Some(6.0));
    }

    #[test]
    fn test_weighted_average_aggregation() {
        let mut parent = Measures::new();

        let mut a = Measures::new();
        a.set(MeasureKind::Lines, 100.0);
        a.set(MeasureKind::CommentDensity, 0.1);
        let mut b = Measures::new();
        b.set(MeasureKind::Lines, 300.0);
        b.set(MeasureKind::CommentDensity, 0.5);

        parent.add_measures(&[&a, &b]);
        // (0.1*100 + 0.5*300) / 400 = 0.4
        assert_eq!(parent.get(MeasureKind::CommentDensity), Some(0.4));
        assert_eq!(parent.get(MeasureKind::Lines), Some(400.0));
    }

    #[test]
    fn test_own_values_participate_with_pre_fold_weight() {
        let mut parent = Measures::new();
        parent.set(MeasureKind::Lines, 100.0);
        parent.set(MeasureKind::CommentDensity, 0.2);

        let mut child = Measures::new();
        child.set(MeasureKind::Lines, 100.0);
        child.set(MeasureKind::CommentDensity, 0.4);

        parent.add_measures(&[&child]);
        // Собственная плотность узла взвешивается его весом до свертки
        assert_eq!(parent.get(MeasureKind::CommentDensity), Some(0.3));
        assert_eq!(parent.get(MeasureKind::Lines), Some(200.0));
    }

    #[test]
    fn test_missing_measures_stay_missing() {
        let mut parent = Measures::new();
        let child = Measures::new();
        parent.add_measures(&[&child]);
        assert!(parent.is_empty());
    }

    #[test]
    fn test_display_formats_integers_without_fraction() {
        let mut measures = Measures::new();
        measures.set(MeasureKind::Files, 3.0);
        measures.set(MeasureKind::CommentDensity, 0.25);
        let text = measures.to_string();
        assert!(text.contains("files=3"));
        assert!(text.contains("comment_density=0.25"));
    }
}
