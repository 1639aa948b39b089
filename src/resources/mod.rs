/*!
# Resources Module

Дерево ресурсов проекта и его наполнение: арена узлов, метрики со
сверткой вверх и сканер исходников.
*/

pub mod measures;
pub mod scanner;
pub mod tree;

pub use measures::{Aggregation, MeasureKind, Measures};
pub use scanner::SourceScanner;
pub use tree::{NodeId, Resource, ResourceKind, ResourceNodeView, ResourceTree};
