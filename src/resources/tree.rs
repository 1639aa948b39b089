/*!
# Resource Tree

Иерархия ресурсов проекта: проект -> пакеты -> файлы (и при
необходимости классы и методы). Дерево хранится в арене: узлы лежат
в одном векторе, связи выражены индексами. Родительская ссылка не
владеющая, поэтому проблем владения при обходах не возникает.

Жизненный цикл узла: значение [`Resource`] существует отдельно от
дерева, после [`ResourceTree::add_child`] узел принадлежит дереву,
после [`ResourceTree::compute`] дерево запечатано и доступно только
для чтения.

## Использование

```rust,ignore
let mut tree = ResourceTree::new("demo");
let pkg = tree.add_child(tree.root(), Resource::new("core", ResourceKind::Package))?;
let file = tree.add_child(pkg, Resource::new("main.cpp", ResourceKind::File))?;
tree.add_measure(file, MeasureKind::Lines, 120.0)?;
tree.compute();
```
*/

use super::measures::{MeasureKind, Measures};
use crate::core::errors::{ImportError, ImportResult};
use crate::location::normalize_separators;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Индекс узла в арене дерева.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(usize);

/// Вид ресурса.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Project,
    Package,
    File,
    Class,
    Method,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Project => "PROJECT",
            ResourceKind::Package => "PACKAGE",
            ResourceKind::File => "FILE",
            ResourceKind::Class => "CLASS",
            ResourceKind::Method => "METHOD",
        };
        write!(f, "{}", name)
    }
}

/// Ресурс до присоединения к дереву.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub name: String,
    pub kind: ResourceKind,
    pub measures: Measures,
}

impl Resource {
    pub fn new(name: impl Into<String>, kind: ResourceKind) -> Self {
        Self {
            name: name.into(),
            kind,
            measures: Measures::new(),
        }
    }

    pub fn with_measure(mut self, kind: MeasureKind, value: f64) -> Self {
        self.measures.set(kind, value);
        self
    }
}

/// Узел арены.
#[derive(Debug, Clone)]
struct Node {
    name: String,
    kind: ResourceKind,
    measures: Measures,
    parent: Option<NodeId>,
    /// Дети, упорядоченные по имени
    children: Vec<NodeId>,
}

/// Дерево ресурсов проекта.
#[derive(Debug, Clone)]
pub struct ResourceTree {
    nodes: Vec<Node>,
    computed: bool,
}

impl ResourceTree {
    /// Создает дерево с корневым узлом проекта.
    pub fn new(project_name: impl Into<String>) -> Self {
        Self {
            nodes: vec![Node {
                name: project_name.into(),
                kind: ResourceKind::Project,
                measures: Measures::new(),
                parent: None,
                children: Vec::new(),
            }],
            computed: false,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        // Корень существует всегда
        false
    }

    pub fn is_computed(&self) -> bool {
        self.computed
    }

    pub fn name(&self, id: NodeId) -> &str {
        &self.nodes[id.0].name
    }

    pub fn kind(&self, id: NodeId) -> ResourceKind {
        self.nodes[id.0].kind
    }

    pub fn measures(&self, id: NodeId) -> &Measures {
        &self.nodes[id.0].measures
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.0].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    /// Присоединяет ресурс к родителю.
    ///
    /// Дети образуют множество по паре (имя, вид): повторное добавление
    /// равного ребенка возвращает существующий узел, метрики дубликата
    /// отбрасываются. Порядок детей всегда отсортирован по имени.
    pub fn add_child(&mut self, parent: NodeId, resource: Resource) -> ImportResult<NodeId> {
        if self.computed {
            return Err(ImportError::TreeSealed);
        }
        if let Some(existing) = self.child_by(parent, &resource.name, resource.kind) {
            return Ok(existing);
        }

        let child_id = NodeId(self.nodes.len());
        let position = {
            let children = &self.nodes[parent.0].children;
            children.partition_point(|&c| self.nodes[c.0].name.as_str() <= resource.name.as_str())
        };
        self.nodes.push(Node {
            name: resource.name,
            kind: resource.kind,
            measures: resource.measures,
            parent: Some(parent),
            children: Vec::new(),
        });
        self.nodes[parent.0].children.insert(position, child_id);
        Ok(child_id)
    }

    /// Прямой ребенок с данным именем и видом.
    fn child_by(&self, parent: NodeId, name: &str, kind: ResourceKind) -> Option<NodeId> {
        self.nodes[parent.0]
            .children
            .iter()
            .copied()
            .find(|&c| self.nodes[c.0].name == name && self.nodes[c.0].kind == kind)
    }

    /// Увеличивает метрику узла.
    pub fn add_measure(&mut self, id: NodeId, kind: MeasureKind, delta: f64) -> ImportResult<()> {
        if self.computed {
            return Err(ImportError::TreeSealed);
        }
        self.nodes[id.0].measures.add(kind, delta);
        Ok(())
    }

    /// Устанавливает значение метрики узла.
    pub fn set_measure(&mut self, id: NodeId, kind: MeasureKind, value: f64) -> ImportResult<()> {
        if self.computed {
            return Err(ImportError::TreeSealed);
        }
        self.nodes[id.0].measures.set(kind, value);
        Ok(())
    }

    /// Ищет узел по имени и виду обходом в глубину от корня.
    pub fn find(&self, name: &str, kind: ResourceKind) -> Option<NodeId> {
        self.find_from(self.root(), name, kind)
    }

    /// Обход в глубину от узла, сам узел включается в поиск.
    pub fn find_from(&self, start: NodeId, name: &str, kind: ResourceKind) -> Option<NodeId> {
        let node = &self.nodes[start.0];
        if node.name == name && node.kind == kind {
            return Some(start);
        }
        for &child in &node.children {
            if let Some(found) = self.find_from(child, name, kind) {
                return Some(found);
            }
        }
        None
    }

    /// Проверяет, содержит ли поддерево узла потомка с именем и видом.
    ///
    /// Сам узел-предок не учитывается. Проверяются все дети, включая
    /// непрямых потомков на любой глубине.
    pub fn contains(&self, ancestor: NodeId, name: &str, kind: ResourceKind) -> bool {
        self.nodes[ancestor.0]
            .children
            .iter()
            .any(|&child| self.find_from(child, name, kind).is_some())
    }

    /// Ищет файл по относительному пути: промежуточные компоненты
    /// ожидаются пакетами, последний — файлом.
    pub fn find_file(&self, relative_path: &str) -> Option<NodeId> {
        let normalized = normalize_separators(relative_path);
        let mut current = self.root();
        let mut components = normalized.split('/').filter(|c| !c.is_empty()).peekable();
        components.peek()?;
        while let Some(component) = components.next() {
            let kind = if components.peek().is_some() {
                ResourceKind::Package
            } else {
                ResourceKind::File
            };
            current = self.child_by(current, component, kind)?;
        }
        Some(current)
    }

    /// Создает цепочку пакетов и файловый узел по относительному пути.
    /// Существующие узлы переиспользуются.
    pub fn add_file_path(&mut self, relative_path: &str) -> ImportResult<NodeId> {
        let normalized = normalize_separators(relative_path);
        let mut current = self.root();
        let mut components = normalized.split('/').filter(|c| !c.is_empty()).peekable();
        if components.peek().is_none() {
            return Err(ImportError::InvalidReport(format!(
                "empty resource path: '{}'",
                relative_path
            )));
        }
        while let Some(component) = components.next() {
            let kind = if components.peek().is_some() {
                ResourceKind::Package
            } else {
                ResourceKind::File
            };
            current = self.add_child(current, Resource::new(component, kind))?;
        }
        Ok(current)
    }

    /// Полное имя узла: имена предков без проекта, через точку.
    pub fn full_name(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if node.kind == ResourceKind::Project {
                break;
            }
            parts.push(node.name.as_str());
            current = node.parent;
        }
        parts.reverse();
        parts.join(".")
    }

    /// Относительный путь узла: имена предков без проекта, через слеш.
    pub fn resource_path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut current = Some(id);
        while let Some(node_id) = current {
            let node = &self.nodes[node_id.0];
            if node.kind == ResourceKind::Project {
                break;
            }
            parts.push(node.name.as_str());
            current = node.parent;
        }
        parts.reverse();
        parts.join("/")
    }

    /// Сворачивает метрики снизу вверх.
    ///
    /// Обход в прямом порядке: сначала вычисляются все дети, затем их
    /// итоги сворачиваются в родителя. Повторный вызов ничего не
    /// делает, поэтому двойной учет исключен. После вызова дерево
    /// запечатано: добавление узлов и метрик возвращает ошибку.
    pub fn compute(&mut self) {
        if self.computed {
            return;
        }
        self.compute_node(self.root());
        self.computed = true;
    }

    fn compute_node(&mut self, id: NodeId) {
        let child_ids = self.nodes[id.0].children.clone();
        for &child in &child_ids {
            self.compute_node(child);
        }
        let child_measures: Vec<Measures> = child_ids
            .iter()
            .map(|&c| self.nodes[c.0].measures.clone())
            .collect();
        let refs: Vec<&Measures> = child_measures.iter().collect();
        self.nodes[id.0].measures.add_measures(&refs);
    }

    /// Вложенное представление дерева для сериализации.
    pub fn to_view(&self) -> ResourceNodeView {
        self.view_of(self.root())
    }

    fn view_of(&self, id: NodeId) -> ResourceNodeView {
        let node = &self.nodes[id.0];
        ResourceNodeView {
            name: node.name.clone(),
            kind: node.kind,
            measures: node.measures.clone(),
            children: node.children.iter().map(|&c| self.view_of(c)).collect(),
        }
    }

    fn render(&self, id: NodeId, depth: usize, out: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = &self.nodes[id.0];
        writeln!(
            out,
            "{}{} : {}:({})",
            "-".repeat(depth),
            node.kind,
            node.name,
            node.measures
        )?;
        for &child in &node.children {
            self.render(child, depth + 1, out)?;
        }
        Ok(())
    }
}

impl fmt::Display for ResourceTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(self.root(), 0, f)
    }
}

/// Вложенный снимок узла для JSON-вывода.
#[derive(Debug, Clone, Serialize)]
pub struct ResourceNodeView {
    pub name: String,
    pub kind: ResourceKind,
    #[serde(skip_serializing_if = "Measures::is_empty")]
    pub measures: Measures,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ResourceNodeView>,
}
