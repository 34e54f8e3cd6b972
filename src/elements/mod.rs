//! Element Model
//!
//! One node type per WSDL 2.0 element, mirroring the documents as written.
//! Every document read during one parse is a [`Description`] stored in the
//! [`Descriptions`] arena; `<import>` and `<include>` refer to their targets by
//! [`DescriptionId`], and top-level elements record the id of the document
//! that declares them. Nested elements are owned by their parent.
//!
//! The arena also answers the scoping questions the reader asks: which
//! documents are in scope of a description, and which interface, binding or
//! operation a qualified name refers to.

pub mod binding;
pub mod common;
pub mod description;
pub mod interface;
pub mod service;
pub mod types;

use std::collections::HashSet;
use std::fmt;
use std::ops::Index;

use url::Url;

use crate::namespaces::QName;

pub use binding::{
    Binding, BindingFault, BindingFaultReference, BindingMessageReference, BindingOperation,
};
pub use common::{Direction, Documentation, ElementReference, MessageLabel};
pub use description::{Description, Import, Include};
pub use interface::{
    Interface, InterfaceFault, InterfaceFaultReference, InterfaceMessageReference,
    InterfaceOperation,
};
pub use service::{Endpoint, Service};
pub use types::{SchemaSource, Types, TypesSchema};

/// Index of a description in the [`Descriptions`] arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DescriptionId(usize);

impl DescriptionId {
    /// Position in the arena
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for DescriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Arena of every description read during one parse
#[derive(Debug, Clone, Default)]
pub struct Descriptions {
    items: Vec<Description>,
}

impl Descriptions {
    /// Create an empty arena
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve a slot for a document about to be parsed
    pub fn reserve(&mut self, document_base_uri: Url) -> DescriptionId {
        let id = DescriptionId(self.items.len());
        self.items.push(Description::new(id, document_base_uri));
        id
    }

    /// Get a description
    pub fn get(&self, id: DescriptionId) -> Option<&Description> {
        self.items.get(id.0)
    }

    /// Get a description mutably
    pub fn get_mut(&mut self, id: DescriptionId) -> Option<&mut Description> {
        self.items.get_mut(id.0)
    }

    /// Every description in read order
    pub fn iter(&self) -> impl Iterator<Item = &Description> {
        self.items.iter()
    }

    /// Number of descriptions
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the arena is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// `id` followed by every document it includes, transitively
    pub fn include_closure(&self, id: DescriptionId) -> Vec<DescriptionId> {
        let mut seen = HashSet::new();
        let mut order = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if !seen.insert(current) {
                continue;
            }
            order.push(current);
            if let Some(description) = self.get(current) {
                for include in description.includes.iter().rev() {
                    if let Some(target) = include.description {
                        stack.push(target);
                    }
                }
            }
        }
        order
    }

    /// Documents whose components are in scope of `root`, `root` excluded
    ///
    /// That is the include closure of `root`, plus every document imported by
    /// a member of that closure together with its own include closure.
    /// Imports of imported documents are not followed.
    pub fn nested(&self, root: DescriptionId) -> Vec<DescriptionId> {
        let closure = self.include_closure(root);
        let mut order: Vec<DescriptionId> = Vec::new();
        let mut seen: HashSet<DescriptionId> = HashSet::new();
        seen.insert(root);

        for id in &closure {
            if seen.insert(*id) {
                order.push(*id);
            }
        }
        for id in &closure {
            let Some(description) = self.get(*id) else {
                continue;
            };
            for import in &description.imports {
                let Some(target) = import.description else {
                    continue;
                };
                for nested in self.include_closure(target) {
                    if seen.insert(nested) {
                        order.push(nested);
                    }
                }
            }
        }
        order
    }

    /// `root` followed by [`nested`](Self::nested)
    pub fn in_scope(&self, root: DescriptionId) -> Vec<DescriptionId> {
        let mut scope = vec![root];
        scope.extend(self.nested(root));
        scope
    }

    /// Interface named `qname` in scope of `from`
    pub fn find_interface(&self, from: DescriptionId, qname: &QName) -> Option<&Interface> {
        self.in_scope(from)
            .into_iter()
            .filter_map(|id| self.get(id))
            .find_map(|d| d.interface(qname))
    }

    /// Binding named `qname` in scope of `from`
    pub fn find_binding(&self, from: DescriptionId, qname: &QName) -> Option<&Binding> {
        self.in_scope(from)
            .into_iter()
            .filter_map(|id| self.get(id))
            .find_map(|d| d.binding(qname))
    }

    /// Service named `qname` in scope of `from`
    pub fn find_service(&self, from: DescriptionId, qname: &QName) -> Option<&Service> {
        self.in_scope(from)
            .into_iter()
            .filter_map(|id| self.get(id))
            .find_map(|d| d.service(qname))
    }

    /// `interface` followed by every interface it extends, directly or not
    ///
    /// Each `extends` name is resolved in scope of the document declaring the
    /// extending interface. Cycles are cut at the first repeated name.
    pub fn interface_hierarchy<'a>(&'a self, interface: &'a Interface) -> Vec<&'a Interface> {
        let mut visited: HashSet<QName> = HashSet::new();
        if let Some(qname) = interface.qname() {
            visited.insert(qname);
        }
        let mut out = vec![interface];
        let mut stack: Vec<&Interface> = vec![interface];
        while let Some(current) = stack.pop() {
            for extended in &current.extends {
                if !visited.insert(extended.clone()) {
                    continue;
                }
                if let Some(found) = self.find_interface(current.description, extended) {
                    out.push(found);
                    stack.push(found);
                }
            }
        }
        out
    }

    /// Operation `qname` of `interface`, inherited ones included
    pub fn find_interface_operation<'a>(
        &'a self,
        interface: &'a Interface,
        qname: &QName,
    ) -> Option<(&'a Interface, &'a InterfaceOperation)> {
        self.interface_hierarchy(interface)
            .into_iter()
            .find_map(|i| i.operation(qname).map(|op| (i, op)))
    }

    /// Fault `qname` of `interface`, inherited ones included
    pub fn find_interface_fault<'a>(
        &'a self,
        interface: &'a Interface,
        qname: &QName,
    ) -> Option<(&'a Interface, &'a InterfaceFault)> {
        self.interface_hierarchy(interface)
            .into_iter()
            .find_map(|i| i.fault(qname).map(|f| (i, f)))
    }
}

impl Index<DescriptionId> for Descriptions {
    type Output = Description;

    fn index(&self, id: DescriptionId) -> &Description {
        &self.items[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(name: &str) -> Url {
        Url::parse(&format!("http://example.com/{}", name)).unwrap()
    }

    fn include(target: DescriptionId) -> Include {
        Include {
            location: None,
            description: Some(target),
            documentation: Vec::new(),
            extensions: Default::default(),
            line: None,
        }
    }

    fn import(target: DescriptionId) -> Import {
        Import {
            namespace: None,
            location: None,
            description: Some(target),
            documentation: Vec::new(),
            extensions: Default::default(),
            line: None,
        }
    }

    #[test]
    fn test_include_closure_is_cycle_safe() {
        let mut arena = Descriptions::new();
        let a = arena.reserve(url("a"));
        let b = arena.reserve(url("b"));
        arena.get_mut(a).unwrap().includes.push(include(b));
        arena.get_mut(b).unwrap().includes.push(include(a));

        assert_eq!(arena.include_closure(a), vec![a, b]);
        assert_eq!(arena.nested(a), vec![b]);
    }

    #[test]
    fn test_imports_are_not_transitive() {
        // a imports b, b includes c, b imports d
        let mut arena = Descriptions::new();
        let a = arena.reserve(url("a"));
        let b = arena.reserve(url("b"));
        let c = arena.reserve(url("c"));
        let d = arena.reserve(url("d"));
        arena.get_mut(a).unwrap().imports.push(import(b));
        arena.get_mut(b).unwrap().includes.push(include(c));
        arena.get_mut(b).unwrap().imports.push(import(d));

        let nested = arena.nested(a);
        assert!(nested.contains(&b));
        assert!(nested.contains(&c));
        assert!(!nested.contains(&d));
    }

    #[test]
    fn test_imports_of_included_documents_are_followed() {
        let mut arena = Descriptions::new();
        let a = arena.reserve(url("a"));
        let b = arena.reserve(url("b"));
        let c = arena.reserve(url("c"));
        arena.get_mut(a).unwrap().includes.push(include(b));
        arena.get_mut(b).unwrap().imports.push(import(c));

        assert_eq!(arena.in_scope(a), vec![a, b, c]);
    }
}
