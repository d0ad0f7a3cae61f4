//! Category tree construction and product filtering.
//!
//! Trees are built from an id-indexed [`CategoryForest`] snapshot rather than
//! from loaded relations, so a malformed parent chain can never recurse
//! forever: every walk tracks the categories on the current path and stops
//! at [`MAX_TREE_DEPTH`].

use std::collections::HashMap;

use serde::Deserialize;
use uuid::Uuid;

use crate::db::entities::{category, product};

/// Deepest category nesting a walk will descend into
pub const MAX_TREE_DEPTH: usize = 64;

/// Optional per-field product filter.
///
/// Every present, non-empty field must be a case-insensitive substring of the
/// matching product field. An empty string counts as absent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProductFilter {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

impl ProductFilter {
    /// True when no field would restrict anything
    pub fn is_empty(&self) -> bool {
        [&self.name, &self.description, &self.image, &self.country]
            .iter()
            .all(|field| field.as_deref().map_or(true, str::is_empty))
    }

    pub fn matches(&self, product: &product::Model) -> bool {
        field_matches(self.name.as_deref(), Some(&product.name))
            && field_matches(self.description.as_deref(), product.description.as_deref())
            && field_matches(self.image.as_deref(), product.image.as_deref())
            && field_matches(self.country.as_deref(), product.country.as_deref())
    }
}

fn field_matches(needle: Option<&str>, value: Option<&str>) -> bool {
    match needle {
        None | Some("") => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

fn passes(filter: Option<&ProductFilter>, product: &product::Model) -> bool {
    filter.map_or(true, |f| f.matches(product))
}

/// In-memory snapshot of categories, their children and their products
#[derive(Debug, Default)]
pub struct CategoryForest {
    categories: HashMap<Uuid, category::Model>,
    children: HashMap<Uuid, Vec<Uuid>>,
    products: HashMap<Uuid, Vec<product::Model>>,
    roots: Vec<Uuid>,
}

impl CategoryForest {
    /// Build a forest from categories and `(category_id, product)` pairs.
    ///
    /// Children and products are ordered by name, then id.
    pub fn new(
        mut categories: Vec<category::Model>,
        assignments: Vec<(Uuid, product::Model)>,
    ) -> Self {
        categories.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));

        let mut forest = CategoryForest::default();
        for category in categories {
            match category.parent_id {
                Some(parent_id) => forest.children.entry(parent_id).or_default().push(category.id),
                None => forest.roots.push(category.id),
            }
            forest.categories.insert(category.id, category);
        }

        for (category_id, product) in assignments {
            forest.products.entry(category_id).or_default().push(product);
        }
        for products in forest.products.values_mut() {
            products.sort_by(|a, b| a.name.cmp(&b.name).then(a.id.cmp(&b.id)));
        }

        forest
    }

    pub fn get(&self, id: Uuid) -> Option<&category::Model> {
        self.categories.get(&id)
    }

    pub fn children(&self, id: Uuid) -> &[Uuid] {
        self.children.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn products(&self, id: Uuid) -> &[product::Model] {
        self.products.get(&id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Categories without a parent, in name order
    pub fn roots(&self) -> &[Uuid] {
        &self.roots
    }
}

/// A category node: child categories first, then products
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode<'a> {
    pub id: Uuid,
    pub name: &'a str,
    pub objects: Vec<TreeItem<'a>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TreeItem<'a> {
    Category(TreeNode<'a>),
    Product(&'a product::Model),
}

/// Categories on the current descent, used to cut cycles
struct Path(Vec<Uuid>);

impl Path {
    fn enter(&mut self, id: Uuid) -> bool {
        if self.0.len() >= MAX_TREE_DEPTH {
            tracing::warn!("Category tree deeper than {} at {}, skipping", MAX_TREE_DEPTH, id);
            return false;
        }
        if self.0.contains(&id) {
            tracing::warn!("Category cycle detected at {}, skipping", id);
            return false;
        }
        self.0.push(id);
        true
    }

    fn leave(&mut self) {
        self.0.pop();
    }
}

/// Build the tree under `root`, keeping only products that pass `filter`.
///
/// A category with no surviving products and no surviving children is
/// elided; `None` means the whole tree was pruned (or `root` is unknown).
pub fn build_filtered_tree<'a>(
    forest: &'a CategoryForest,
    root: Uuid,
    filter: Option<&ProductFilter>,
) -> Option<TreeNode<'a>> {
    build_node(forest, root, filter, true, &mut Path(Vec::new()))
}

/// Build the complete tree under `root` with no filtering or pruning
pub fn build_full_tree(forest: &CategoryForest, root: Uuid) -> Option<TreeNode<'_>> {
    build_node(forest, root, None, false, &mut Path(Vec::new()))
}

fn build_node<'a>(
    forest: &'a CategoryForest,
    id: Uuid,
    filter: Option<&ProductFilter>,
    prune: bool,
    path: &mut Path,
) -> Option<TreeNode<'a>> {
    let category = forest.get(id)?;
    if !path.enter(id) {
        return None;
    }

    let mut objects = Vec::new();
    for child in forest.children(id) {
        if let Some(node) = build_node(forest, *child, filter, prune, path) {
            objects.push(TreeItem::Category(node));
        }
    }
    objects.extend(
        forest
            .products(id)
            .iter()
            .filter(|product| passes(filter, product))
            .map(TreeItem::Product),
    );

    path.leave();

    if prune && objects.is_empty() {
        return None;
    }

    Some(TreeNode {
        id,
        name: &category.name,
        objects,
    })
}

/// Flatten every product under `root` that passes `filter`.
///
/// A category's own products come before its children's; children are
/// visited in order. A product linked to several categories appears once
/// per link.
pub fn collect_filtered_products<'a>(
    forest: &'a CategoryForest,
    root: Uuid,
    filter: Option<&ProductFilter>,
) -> Vec<&'a product::Model> {
    let mut out = Vec::new();
    collect_into(forest, root, filter, &mut Path(Vec::new()), &mut out);
    out
}

fn collect_into<'a>(
    forest: &'a CategoryForest,
    id: Uuid,
    filter: Option<&ProductFilter>,
    path: &mut Path,
    out: &mut Vec<&'a product::Model>,
) {
    if forest.get(id).is_none() || !path.enter(id) {
        return;
    }

    out.extend(forest.products(id).iter().filter(|product| passes(filter, product)));
    for child in forest.children(id) {
        collect_into(forest, *child, filter, path, out);
    }

    path.leave();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn category(name: &str, parent_id: Option<Uuid>) -> category::Model {
        category::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            parent_id,
        }
    }

    fn product(name: &str) -> product::Model {
        product::Model {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            image: None,
            country: None,
        }
    }

    fn name_filter(name: &str) -> ProductFilter {
        ProductFilter {
            name: Some(name.to_string()),
            ..Default::default()
        }
    }

    fn product_names(items: &[TreeItem<'_>]) -> Vec<String> {
        items
            .iter()
            .filter_map(|item| match item {
                TreeItem::Product(p) => Some(p.name.clone()),
                TreeItem::Category(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_steel_beam_scenario() {
        let c1 = category("C1", None);
        let c2 = category("C2", Some(c1.id));
        let p1 = product("Steel Beam");
        let (c1_id, c2_id, p1_id) = (c1.id, c2.id, p1.id);
        let forest = CategoryForest::new(vec![c1, c2], vec![(c2_id, p1)]);

        let tree = build_filtered_tree(&forest, c1_id, Some(&name_filter("steel"))).unwrap();
        assert_eq!(tree.id, c1_id);
        assert_eq!(tree.objects.len(), 1);
        match &tree.objects[0] {
            TreeItem::Category(node) => {
                assert_eq!(node.id, c2_id);
                assert_eq!(node.objects.len(), 1);
                assert!(matches!(node.objects[0], TreeItem::Product(p) if p.id == p1_id));
            }
            other => panic!("expected category node, got {:?}", other),
        }

        assert!(build_filtered_tree(&forest, c1_id, Some(&name_filter("wood"))).is_none());
    }

    #[test]
    fn test_filter_is_case_insensitive_substring() {
        let filter = name_filter("west");
        assert!(filter.matches(&product("Westbound Corp")));
        assert!(!filter.matches(&product("Eastbound Corp")));

        let upper = name_filter("BEAM");
        assert!(upper.matches(&product("steel beam")));
    }

    #[test]
    fn test_empty_string_filter_is_absent() {
        let filter = ProductFilter {
            name: Some(String::new()),
            country: Some(String::new()),
            ..Default::default()
        };
        assert!(filter.is_empty());
        assert!(filter.matches(&product("Anything")));
        assert!(!name_filter("x").is_empty());
    }

    #[test]
    fn test_null_field_never_matches() {
        let filter = ProductFilter {
            country: Some("ger".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&product("Steel")));

        let mut german = product("Steel");
        german.country = Some("Germany".to_string());
        assert!(filter.matches(&german));
    }

    #[test]
    fn test_all_fields_must_match() {
        let mut p = product("Cement");
        p.description = Some("Portland type I".to_string());
        p.country = Some("Poland".to_string());

        let both = ProductFilter {
            name: Some("cem".to_string()),
            country: Some("pol".to_string()),
            ..Default::default()
        };
        assert!(both.matches(&p));

        let mismatch = ProductFilter {
            name: Some("cem".to_string()),
            description: Some("type II".to_string()),
            ..Default::default()
        };
        assert!(!mismatch.matches(&p));
    }

    #[test]
    fn test_objects_len_counts_products_and_surviving_children() {
        let root = category("Root", None);
        let full = category("Full", Some(root.id));
        let empty = category("Empty", Some(root.id));
        let root_id = root.id;
        let full_id = full.id;
        let forest = CategoryForest::new(
            vec![root, full, empty],
            vec![
                (root_id, product("Bolt")),
                (root_id, product("Nut")),
                (full_id, product("Rivet")),
            ],
        );

        let tree = build_filtered_tree(&forest, root_id, None).unwrap();
        // two direct products plus the one non-empty child
        assert_eq!(tree.objects.len(), 3);
        assert!(matches!(&tree.objects[0], TreeItem::Category(node) if node.id == full_id));
        assert_eq!(product_names(&tree.objects), vec!["Bolt", "Nut"]);
    }

    #[test]
    fn test_all_empty_tree_is_pruned() {
        let root = category("Root", None);
        let a = category("A", Some(root.id));
        let b = category("B", Some(a.id));
        let root_id = root.id;
        let forest = CategoryForest::new(vec![root, a, b], vec![]);

        assert!(build_filtered_tree(&forest, root_id, None).is_none());
        assert!(build_filtered_tree(&forest, root_id, Some(&ProductFilter::default())).is_none());
    }

    #[test]
    fn test_children_ordered_by_name_before_products() {
        let root = category("Root", None);
        let zeta = category("Zeta", Some(root.id));
        let alpha = category("Alpha", Some(root.id));
        let (root_id, zeta_id, alpha_id) = (root.id, zeta.id, alpha.id);
        let forest = CategoryForest::new(
            vec![root, zeta, alpha],
            vec![
                (zeta_id, product("Z1")),
                (alpha_id, product("A1")),
                (root_id, product("R2")),
                (root_id, product("R1")),
            ],
        );

        let tree = build_filtered_tree(&forest, root_id, None).unwrap();
        let ids: Vec<Option<Uuid>> = tree
            .objects
            .iter()
            .map(|item| match item {
                TreeItem::Category(node) => Some(node.id),
                TreeItem::Product(_) => None,
            })
            .collect();
        assert_eq!(ids, vec![Some(alpha_id), Some(zeta_id), None, None]);
        assert_eq!(product_names(&tree.objects), vec!["R1", "R2"]);
    }

    #[test]
    fn test_full_tree_keeps_empty_categories() {
        let root = category("Root", None);
        let empty = category("Empty", Some(root.id));
        let (root_id, empty_id) = (root.id, empty.id);
        let forest = CategoryForest::new(vec![root, empty], vec![]);

        let tree = build_full_tree(&forest, root_id).unwrap();
        assert_eq!(tree.objects.len(), 1);
        assert!(matches!(&tree.objects[0], TreeItem::Category(node)
            if node.id == empty_id && node.objects.is_empty()));

        assert!(build_full_tree(&forest, Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_collect_unfiltered_returns_every_link() {
        let root = category("Root", None);
        let a = category("A", Some(root.id));
        let b = category("B", Some(root.id));
        let a1 = category("A1", Some(a.id));
        let shared = product("Shared");
        let (root_id, a_id, b_id, a1_id) = (root.id, a.id, b.id, a1.id);
        let forest = CategoryForest::new(
            vec![root, a, b, a1],
            vec![
                (root_id, product("R")),
                (a_id, product("A")),
                (a1_id, shared.clone()),
                (b_id, shared),
                (b_id, product("B")),
            ],
        );

        let names: Vec<&str> = collect_filtered_products(&forest, root_id, None)
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        // own products first, then children in order
        assert_eq!(names, vec!["R", "A", "Shared", "B", "Shared"]);
    }

    #[test]
    fn test_collect_applies_filter() {
        let root = category("Root", None);
        let child = category("Child", Some(root.id));
        let (root_id, child_id) = (root.id, child.id);
        let forest = CategoryForest::new(
            vec![root, child],
            vec![
                (root_id, product("Steel Pipe")),
                (child_id, product("Steel Beam")),
                (child_id, product("Timber")),
            ],
        );

        let names: Vec<&str> =
            collect_filtered_products(&forest, root_id, Some(&name_filter("STEEL")))
                .iter()
                .map(|p| p.name.as_str())
                .collect();
        assert_eq!(names, vec!["Steel Pipe", "Steel Beam"]);
    }

    #[test]
    fn test_cycle_is_cut() {
        let mut a = category("A", None);
        let mut b = category("B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);
        let (a_id, b_id) = (a.id, b.id);
        let forest = CategoryForest::new(vec![a, b], vec![(b_id, product("Loop"))]);

        assert!(forest.roots().is_empty());

        let tree = build_full_tree(&forest, a_id).unwrap();
        match &tree.objects[0] {
            TreeItem::Category(node) => {
                assert_eq!(node.id, b_id);
                // a is on the path already, so only b's product remains
                assert_eq!(node.objects.len(), 1);
            }
            other => panic!("expected category node, got {:?}", other),
        }

        let collected = collect_filtered_products(&forest, a_id, None);
        assert_eq!(collected.len(), 1);
    }

    #[test]
    fn test_depth_limit() {
        let mut categories = vec![category("level-0", None)];
        for level in 1..(MAX_TREE_DEPTH + 10) {
            let parent = categories[level - 1].id;
            categories.push(category(&format!("level-{}", level), Some(parent)));
        }
        let root_id = categories[0].id;
        let deepest = categories.last().unwrap().id;
        let forest = CategoryForest::new(categories, vec![(deepest, product("Deep"))]);

        // the product sits below the depth limit, so nothing survives
        assert!(build_filtered_tree(&forest, root_id, None).is_none());
        assert!(collect_filtered_products(&forest, root_id, None).is_empty());
    }
}
