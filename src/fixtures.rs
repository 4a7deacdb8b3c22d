//! Shared test types

use crate::{Context, Descriptor, DiError, Injectable, Resolver, Result, Shared, TypeKey, Value};
use parking_lot::Mutex;

pub(crate) trait InterfaceA: Send + Sync {
    fn method_a(&self) -> i32;
}

pub(crate) trait InterfaceB: Send + Sync {
    fn method_b(&self) -> i32;
}

pub(crate) trait ServiceInterface: Send + Sync {
    fn service_method(&self) -> bool;
}

// =============================================================================
// Cycle
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct StructA {
    pub(crate) b: Option<Shared<StructB>>,
}

impl Injectable for StructA {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("b", |s| &s.b, |s| &mut s.b);
    }
}

#[derive(Clone, Default)]
pub(crate) struct StructB {
    pub(crate) a: Option<Shared<StructA>>,
}

impl Injectable for StructB {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("a", |s| &s.a, |s| &mut s.a);
    }
}

// =============================================================================
// Interface implementors
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct PtrImplA {
    pub(crate) b: Option<Shared<dyn InterfaceB>>,
}

impl InterfaceA for PtrImplA {
    fn method_a(&self) -> i32 {
        1
    }
}

impl Injectable for PtrImplA {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("b", |s| &s.b, |s| &mut s.b)
            .implements::<dyn InterfaceA>(|s| s as Shared<dyn InterfaceA>);
    }
}

#[derive(Clone, Default)]
pub(crate) struct PtrImplB {
    pub(crate) a: Option<Shared<dyn InterfaceA>>,
}

impl InterfaceB for PtrImplB {
    fn method_b(&self) -> i32 {
        2
    }
}

impl Injectable for PtrImplB {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("a", |s| &s.a, |s| &mut s.a)
            .implements::<dyn InterfaceB>(|s| s as Shared<dyn InterfaceB>);
    }
}

#[derive(Clone, Default)]
pub(crate) struct Decorator {
    pub(crate) decorated: Option<Shared<dyn InterfaceA>>,
}

impl InterfaceA for Decorator {
    fn method_a(&self) -> i32 {
        self.decorated
            .as_ref()
            .map_or(0, |inner| inner.read().method_a() + 1)
    }
}

impl Injectable for Decorator {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("decorated", |s| &s.decorated, |s| &mut s.decorated)
            .implements::<dyn InterfaceA>(|s| s as Shared<dyn InterfaceA>);
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Decorated;

impl InterfaceA for Decorated {
    fn method_a(&self) -> i32 {
        1
    }
}

impl Injectable for Decorated {
    fn describe(d: &mut Descriptor<Self>) {
        d.implements::<dyn InterfaceA>(|s| s as Shared<dyn InterfaceA>);
    }
}

#[derive(Clone, Default)]
pub(crate) struct ServiceValueImpl {
    pub(crate) x: Option<Shared<dyn InterfaceA>>,
}

impl ServiceInterface for ServiceValueImpl {
    fn service_method(&self) -> bool {
        self.x.is_some()
    }
}

impl Injectable for ServiceValueImpl {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("x", |s| &s.x, |s| &mut s.x)
            .implements::<dyn ServiceInterface>(|s| s as Shared<dyn ServiceInterface>);
    }
}

#[derive(Clone, Default)]
pub(crate) struct ServiceB {
    pub(crate) y: Option<Shared<ServiceValueImpl>>,
}

impl Injectable for ServiceB {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("y", |s| &s.y, |s| &mut s.y);
    }
}

#[derive(Clone, Default)]
pub(crate) struct CustomA {
    pub(crate) val: i32,
}

impl InterfaceA for CustomA {
    fn method_a(&self) -> i32 {
        self.val
    }
}

impl Injectable for CustomA {
    fn describe(d: &mut Descriptor<Self>) {
        d.implements::<dyn InterfaceA>(|s| s as Shared<dyn InterfaceA>);
    }
}

// =============================================================================
// Named and layered
// =============================================================================

#[derive(Clone, Default)]
pub(crate) struct Named {
    pub(crate) x: Option<i32>,
    pub(crate) y: Option<i32>,
    pub(crate) z: Option<i32>,
}

impl Injectable for Named {
    fn describe(d: &mut Descriptor<Self>) {
        d.named_field("x", "ValA", |s| &s.x, |s| &mut s.x)
            .named_field("y", "ValB", |s| &s.y, |s| &mut s.y)
            .field("z", |s| &s.z, |s| &mut s.z);
    }
}

#[derive(Clone, Default)]
pub(crate) struct Endpoint {
    pub(crate) url: Option<String>,
}

impl Injectable for Endpoint {
    fn describe(d: &mut Descriptor<Self>) {
        d.named_field("url", "url", |s| &s.url, |s| &mut s.url);
    }
}

#[derive(Clone, Default)]
pub(crate) struct LevelOne;

impl Injectable for LevelOne {}

#[derive(Clone, Default)]
pub(crate) struct LevelTwo {
    pub(crate) one: Option<Shared<LevelOne>>,
}

impl Injectable for LevelTwo {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("one", |s| &s.one, |s| &mut s.one);
    }
}

#[derive(Clone, Default)]
pub(crate) struct LevelThree {
    pub(crate) two: Option<Shared<LevelTwo>>,
}

impl Injectable for LevelThree {
    fn describe(d: &mut Descriptor<Self>) {
        d.field("two", |s| &s.two, |s| &mut s.two);
    }
}

// =============================================================================
// Resolvers
// =============================================================================

/// Resolver with nothing registered.
pub(crate) struct NullResolver;

impl Resolver for NullResolver {
    fn find(&self, ty: TypeKey, _context: Option<&Context>, _name: &str) -> Result<Value> {
        Err(DiError::no_provider(ty))
    }

    fn complete_value(&self, _target: &Value) -> Result<()> {
        Ok(())
    }
}

/// Resolver that serves canned values and records every call.
#[derive(Default)]
pub(crate) struct RecordingResolver {
    values: Vec<Value>,
    fail_completion: bool,
    pub(crate) finds: Mutex<Vec<TypeKey>>,
    pub(crate) completions: Mutex<Vec<TypeKey>>,
}

impl RecordingResolver {
    pub(crate) fn serving(values: Vec<Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    pub(crate) fn failing_completion() -> Self {
        Self {
            fail_completion: true,
            ..Self::default()
        }
    }
}

impl Resolver for RecordingResolver {
    fn find(&self, ty: TypeKey, _context: Option<&Context>, _name: &str) -> Result<Value> {
        self.finds.lock().push(ty);
        self.values
            .iter()
            .find_map(|v| v.coerce(ty))
            .ok_or_else(|| DiError::no_provider(ty))
    }

    fn complete_value(&self, target: &Value) -> Result<()> {
        self.completions.lock().push(target.type_key());
        if self.fail_completion {
            return Err(DiError::no_provider(target.type_key()));
        }
        Ok(())
    }
}
