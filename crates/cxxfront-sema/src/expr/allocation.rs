//! `new` and `delete`.
//!
//! ## Algorithm
//!
//! `new T(args)` / `new (placement) T[n]`:
//!
//! 1. `T` must be a complete object type; abstract classes are rejected.
//! 2. The byte count is a synthetic `sizeof(T)` node. A constant array
//!    length folds into it; any other length multiplies it at run time.
//! 3. `operator new` (or `operator new[]`) is looked up in the class first,
//!    then at global scope, and resolved against `(size, placement...)`.
//!    No global allocation function at all is fatal.
//! 4. A class type picks its constructor by overload resolution over the
//!    initializer; a scalar takes at most one initializer.
//!
//! `delete p` needs an object pointer. The deallocation function is found
//! the same way and the destructor must be accessible.

use std::rc::Rc;

use cxxfront_core::{
    ClassId, Declaration, DeleteExpr, ExprKind, FunctionEntry, LookupEntry, NewExpr, Operand,
    OperatorCode, PrimitiveKind, Qualifiers, SemaError, Span, TypeDescriptor,
};
use tracing::{debug, trace};

use super::{Result, convert_to, decayed, invalid, mismatch, value_type};
use crate::SemaContext;
use crate::access::{MemberRef, check_member};
use crate::classify::{is_function_type, is_integral, is_pointer, is_void};
use crate::constant;
use crate::overload;

/// What a `new` expression asks for.
#[derive(Debug, Clone)]
pub struct NewRequest {
    pub ty: TypeDescriptor,
    pub array_length: Option<Rc<Operand>>,
    pub placement: Vec<Rc<Operand>>,
    pub initializer: Vec<Rc<Operand>>,
}

impl NewRequest {
    /// `new T`.
    pub fn object(ty: TypeDescriptor) -> Self {
        Self {
            ty,
            array_length: None,
            placement: Vec::new(),
            initializer: Vec::new(),
        }
    }

    /// `new T[length]`.
    pub fn array(ty: TypeDescriptor, length: Rc<Operand>) -> Self {
        Self {
            array_length: Some(length),
            ..Self::object(ty)
        }
    }

    pub fn with_placement(mut self, args: Vec<Rc<Operand>>) -> Self {
        self.placement = args;
        self
    }

    pub fn with_initializer(mut self, args: Vec<Rc<Operand>>) -> Self {
        self.initializer = args;
        self
    }

    /// Every operand the request carries.
    pub fn operands(&self) -> impl Iterator<Item = &Rc<Operand>> {
        self.array_length
            .iter()
            .chain(&self.placement)
            .chain(&self.initializer)
    }

    fn is_array(&self) -> bool {
        self.array_length.is_some()
    }
}

fn size_type() -> TypeDescriptor {
    TypeDescriptor::primitive(PrimitiveKind::UnsignedLong)
}

fn size_node(measured: TypeDescriptor, bytes: Option<u64>, span: Span) -> Rc<Operand> {
    Operand::expression(
        ExprKind::SizeOf { measured, bytes },
        size_type(),
        false,
        span,
    )
}

// ============================================================================
// new
// ============================================================================

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_new(
    ctx: &mut SemaContext<'_>,
    request: &NewRequest,
    span: Span,
) -> Result<Rc<Operand>> {
    let op = if request.is_array() {
        OperatorCode::NewArray
    } else {
        OperatorCode::New
    };
    let ty = &request.ty;
    if is_void(ty) || is_function_type(ty) || ty.is_reference() {
        return Err(mismatch(&format!("cannot allocate an object of type '{ty}'"), span));
    }
    if let Some(class) = ty.class_id() {
        let view = ctx.registry().class_graph(class.hash());
        if !view.is_some_and(|v| v.is_complete()) {
            return Err(SemaError::Structural {
                message: format!("allocation of incomplete type '{class}'"),
                span,
            });
        }
        if view.is_some_and(|v| v.is_abstract()) {
            return Err(SemaError::Structural {
                message: format!("allocation of an object of abstract class '{class}'"),
                span,
            });
        }
    }
    let Some(element_bytes) = ctx.registry().size_of(ty) else {
        return Err(SemaError::Structural {
            message: format!("allocation of incomplete type '{ty}'"),
            span,
        });
    };

    let size = match &request.array_length {
        None => size_node(ty.clone(), Some(element_bytes), span),
        Some(length) => array_size(ctx, ty, element_bytes, length, span)?,
    };

    let mut allocator_args = vec![Rc::clone(&size)];
    allocator_args.extend(request.placement.iter().cloned());
    let allocator = allocation_function(ctx, op, ty.class_id(), &allocator_args, span)?;
    let placement = overload::convert_arguments(&allocator, &allocator_args)
        .into_iter()
        .skip(1)
        .collect();

    let (constructor, initializer) = initialize(ctx, request, span)?;
    debug!(
        ty = %ty,
        allocator = %allocator.function,
        constructor = constructor.as_ref().map(|c| c.to_string()),
        "new expression"
    );
    Ok(Operand::expression(
        ExprKind::New(NewExpr {
            allocated: ty.clone(),
            size,
            array_length: request.array_length.clone(),
            placement,
            initializer,
            allocator: allocator.function,
            constructor,
        }),
        ty.pointer_to(),
        false,
        span,
    ))
}

/// Byte count of `new T[length]`.
fn array_size(
    ctx: &mut SemaContext<'_>,
    ty: &TypeDescriptor,
    element_bytes: u64,
    length: &Rc<Operand>,
    span: Span,
) -> Result<Rc<Operand>> {
    let length_ty = value_type(length, span)?;
    if !is_integral(&length_ty) {
        return Err(invalid(
            OperatorCode::NewArray,
            format!("array size of type '{length_ty}' is not integral"),
            span,
        ));
    }
    match constant::evaluate(length) {
        Some(n) if n < 0 => Err(mismatch("array size is negative", span)),
        Some(n) => {
            let count = u64::try_from(n).map_err(|_| mismatch("array size is too large", span))?;
            let bytes = element_bytes.checked_mul(count);
            trace!(count, ?bytes, "constant array length");
            Ok(size_node(ty.array_of(Some(count)), bytes, span))
        }
        None => {
            let length = convert_to(ctx, length, &size_type(), span)?;
            Ok(Operand::expression(
                ExprKind::Binary {
                    op: OperatorCode::Mul,
                    lhs: size_node(ty.clone(), Some(element_bytes), span),
                    rhs: length,
                },
                size_type(),
                false,
                span,
            ))
        }
    }
}

/// Class-scope allocation functions first, then global ones.
fn allocation_candidates(
    ctx: &SemaContext<'_>,
    op: OperatorCode,
    class: Option<&ClassId>,
) -> (Vec<Rc<FunctionEntry>>, bool) {
    let Some(name) = op.function_name() else {
        return (Vec::new(), false);
    };
    let registry = ctx.registry();
    let functions = |entries: Vec<LookupEntry>| -> Vec<Rc<FunctionEntry>> {
        entries
            .iter()
            .filter_map(|e| e.decl.as_function().cloned())
            .collect()
    };
    if let Some(class) = class {
        let members = functions(registry.lookup_in_class(class, name));
        if !members.is_empty() {
            return (members, true);
        }
    }
    (functions(registry.lookup_in_namespace(&[], name)), false)
}

fn allocation_function(
    ctx: &mut SemaContext<'_>,
    op: OperatorCode,
    class: Option<&ClassId>,
    args: &[Rc<Operand>],
    span: Span,
) -> Result<overload::Selection> {
    let (candidates, in_class) = allocation_candidates(ctx, op, class);
    let name = op.function_name().unwrap_or("operator new");
    if candidates.is_empty() {
        return Err(SemaError::Fatal {
            message: format!("no '{name}' available"),
            span,
        });
    }
    trace!(name, in_class, candidates = candidates.len(), "allocation lookup");
    let result = overload::resolve(ctx, &candidates, args, None);
    overload::select(ctx, name, result, args, None, span)
}

/// Constructor and converted initializer of the allocated object.
fn initialize(
    ctx: &mut SemaContext<'_>,
    request: &NewRequest,
    span: Span,
) -> Result<(Option<Rc<FunctionEntry>>, Vec<Rc<Operand>>)> {
    let ty = &request.ty;
    let args = &request.initializer;
    let Some(class) = ty.class_id() else {
        return match args.as_slice() {
            [] => Ok((None, Vec::new())),
            [value] if !request.is_array() => {
                Ok((None, vec![convert_to(ctx, value, &ty.unqualified(), span)?]))
            }
            _ => Err(mismatch(
                &format!("too many initializers for '{ty}'"),
                span,
            )),
        };
    };
    let constructors: Vec<Rc<FunctionEntry>> = ctx
        .registry()
        .class_graph(class.hash())
        .map(|view| view.constructors().cloned().collect())
        .unwrap_or_default();
    if constructors.is_empty() {
        return match args.as_slice() {
            [] => Ok((None, Vec::new())),
            [value] => {
                let copy = ty.unqualified().with_base_quals(Qualifiers::CONST).reference_to();
                Ok((None, vec![convert_to(ctx, value, &copy, span)?]))
            }
            _ => Err(SemaError::NoMatchingOverload {
                name: class.to_string(),
                args: overload::describe_args(args),
                span,
            }),
        };
    }
    let result = overload::resolve(ctx, &constructors, args, None);
    let selection = overload::select(ctx, &class.to_string(), result, args, None, span)?;
    let converted = overload::convert_arguments(&selection, args);
    Ok((Some(selection.function), converted))
}

// ============================================================================
// delete
// ============================================================================

#[cfg_attr(feature = "profiling", profiling::function)]
pub(super) fn build_delete(
    ctx: &mut SemaContext<'_>,
    operand: &Rc<Operand>,
    is_array: bool,
    span: Span,
) -> Result<Rc<Operand>> {
    let op = if is_array {
        OperatorCode::DeleteArray
    } else {
        OperatorCode::Delete
    };
    let operand = decayed(operand, span)?;
    let ty = value_type(&operand, span)?;
    let pointee = match ty.pointee() {
        Some(pointee) if is_pointer(&ty) && !is_function_type(&pointee) => pointee,
        _ => {
            return Err(invalid(
                op,
                format!("cannot delete an expression of type '{ty}'"),
                span,
            ));
        }
    };

    let mut class = None;
    if let Some(id) = pointee.class_id() {
        let complete = ctx
            .registry()
            .class_graph(id.hash())
            .is_some_and(|view| view.is_complete());
        if complete {
            class = Some(id.clone());
        } else {
            ctx.warn(
                span,
                format!("deleting a pointer to incomplete type '{id}' may not call its destructor"),
            );
        }
    } else if is_void(&pointee) {
        ctx.warn(span, format!("deleting '{ty}' is undefined"));
    }

    let args = [Rc::clone(&operand)];
    let (candidates, _) = allocation_candidates(ctx, op, class.as_ref());
    let name = op.function_name().unwrap_or("operator delete");
    if candidates.is_empty() {
        return Err(SemaError::Fatal {
            message: format!("no '{name}' available"),
            span,
        });
    }
    let result = overload::resolve(ctx, &candidates, &args, None);
    let deallocator = overload::select(ctx, name, result, &args, None, span)?;

    let destructor = match &class {
        Some(id) => {
            let destructor = ctx
                .registry()
                .class_graph(id.hash())
                .and_then(|view| view.destructor().cloned());
            if let Some(destructor) = &destructor {
                let member = MemberRef::new(Declaration::Function(Rc::clone(destructor)));
                check_member(ctx, &member, id, span)?;
            }
            destructor
        }
        None => None,
    };

    Ok(Operand::expression(
        ExprKind::Delete(DeleteExpr {
            operand,
            is_array,
            deallocator: deallocator.function,
            destructor,
        }),
        TypeDescriptor::void(),
        false,
        span,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cxxfront_core::{Access, ClassEntry, VariableEntry};
    use cxxfront_registry::SymbolRegistry;

    use crate::ExprBuilder;

    fn variable(name: &str, ty: TypeDescriptor) -> Rc<Operand> {
        Operand::identifier(
            Declaration::Variable(Rc::new(VariableEntry::global(name, ty))),
            Span::new(1, 1, 1),
        )
    }

    fn new_expr(node: &Operand) -> &NewExpr {
        match node.as_expression().map(|e| &e.kind) {
            Some(ExprKind::New(new)) => new,
            other => panic!("expected a new expression, got {other:?}"),
        }
    }

    fn size_bytes(node: &Operand) -> Option<u64> {
        match node.as_expression().map(|e| &e.kind) {
            Some(ExprKind::SizeOf { bytes, .. }) => *bytes,
            _ => None,
        }
    }

    #[test]
    fn scalar_new_yields_a_pointer_and_a_synthetic_size() {
        let registry = SymbolRegistry::with_default_allocators();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let node = builder.build_new(
            &NewRequest::object(TypeDescriptor::int())
                .with_initializer(vec![Operand::integer(7, Span::new(1, 9, 1))]),
            Span::new(1, 1, 10),
        );
        assert_eq!(node.ty(), Some(&TypeDescriptor::int().pointer_to()));
        assert!(!node.is_lvalue());
        let new = new_expr(&node);
        assert_eq!(size_bytes(&new.size), Some(4));
        assert_eq!(new.allocator.name, "operator new");
        assert_eq!(new.initializer.len(), 1);
    }

    #[test]
    fn constant_array_lengths_fold_into_the_size() {
        let registry = SymbolRegistry::with_default_allocators();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let folded = builder.build_expression(
            OperatorCode::NewArray,
            &[
                Operand::type_name(TypeDescriptor::int(), Span::new(1, 5, 3)),
                Operand::integer(3, Span::new(1, 9, 1)),
            ],
            Span::new(1, 1, 10),
        );
        assert_eq!(size_bytes(&new_expr(&folded).size), Some(12));
        assert_eq!(new_expr(&folded).allocator.name, "operator new[]");

        let n = variable("n", TypeDescriptor::int());
        let dynamic = builder.build_new(
            &NewRequest::array(TypeDescriptor::int(), n),
            Span::new(2, 1, 10),
        );
        assert!(matches!(
            new_expr(&dynamic).size.as_expression().map(|e| &e.kind),
            Some(ExprKind::Binary { op: OperatorCode::Mul, .. })
        ));

        let negative = builder.build_new(
            &NewRequest::array(TypeDescriptor::int(), Operand::integer(-1, Span::new(3, 9, 2))),
            Span::new(3, 1, 11),
        );
        assert!(negative.is_error());
    }

    #[test]
    fn class_new_selects_a_constructor() {
        let mut registry = SymbolRegistry::with_default_allocators();
        let widget = ClassId::new("Widget");
        registry
            .register_class(
                ClassEntry::class("Widget")
                    .with_field("n", TypeDescriptor::int(), Access::Private)
                    .with_method(FunctionEntry::constructor(&widget))
                    .with_method(
                        FunctionEntry::constructor(&widget).with_param("n", TypeDescriptor::int()),
                    ),
            )
            .unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let node = builder.build_new(
            &NewRequest::object(TypeDescriptor::class(widget.clone()))
                .with_initializer(vec![Operand::integer(1, Span::new(1, 12, 1))]),
            Span::new(1, 1, 13),
        );
        let constructor = new_expr(&node).constructor.clone();
        assert_eq!(constructor.map(|c| c.params.len()), Some(1));
        let request = NewRequest::object(TypeDescriptor::class(widget));
        let default = builder.build_new(&request, Span::new(2, 1, 10));
        let params = new_expr(&default).constructor.as_ref().map(|c| c.params.len());
        assert_eq!(params, Some(0));
    }

    #[test]
    fn abstract_and_incomplete_classes_cannot_be_allocated() {
        let mut registry = SymbolRegistry::with_default_allocators();
        let shape = ClassId::new("Shape");
        registry
            .register_class(
                ClassEntry::class("Shape").with_method(
                    FunctionEntry::method(&shape, "area", TypeDescriptor::int())
                        .as_virtual()
                        .as_pure(),
                ),
            )
            .unwrap();
        let later = registry.register_class(ClassEntry::forward("Later")).unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let abstract_new = NewRequest::object(TypeDescriptor::class(shape));
        assert!(builder.build_new(&abstract_new, Span::new(1, 1, 9)).is_error());
        let incomplete_new = NewRequest::object(TypeDescriptor::class(later));
        assert!(builder.build_new(&incomplete_new, Span::new(2, 1, 9)).is_error());
        let messages: Vec<&str> = ctx.diagnostics().errors().map(|d| d.message.as_str()).collect();
        assert_eq!(
            messages,
            vec![
                "allocation of an object of abstract class 'Shape'",
                "allocation of incomplete type 'Later'",
            ]
        );
    }

    #[test]
    fn class_scope_allocation_functions_come_first() {
        let mut registry = SymbolRegistry::with_default_allocators();
        let pool = ClassId::new("Pool");
        let void_ptr = TypeDescriptor::void().pointer_to();
        let allocator = FunctionEntry::operator(Some(&pool), OperatorCode::New, void_ptr)
            .map(|f| f.with_param("n", size_type()).as_static());
        let mut entry = ClassEntry::structure("Pool");
        if let Some(f) = allocator {
            entry = entry.with_method(f);
        }
        registry.register_class(entry).unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let request = NewRequest::object(TypeDescriptor::class(pool.clone()));
        let node = builder.build_new(&request, Span::new(1, 1, 8));
        assert_eq!(new_expr(&node).allocator.owner.as_ref(), Some(&pool));
    }

    #[test]
    fn missing_allocation_functions_are_fatal() {
        let registry = SymbolRegistry::new();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);
        let p = variable("p", TypeDescriptor::int().pointer_to());
        assert!(builder.build_delete(&p, false, Span::new(1, 1, 8)).is_error());
        let request = NewRequest::object(TypeDescriptor::int());
        assert!(builder.build_new(&request, Span::new(2, 1, 7)).is_error());
        assert!(ctx.is_fatal());
        assert_eq!(ctx.diagnostics().len(), 1);
        assert_eq!(
            ctx.diagnostics().last().map(|d| d.message.as_str()),
            Some("no 'operator delete' available")
        );
        assert_eq!(ctx.diagnostics().exit_code(), 2);
    }

    #[test]
    fn delete_checks_the_operand_and_the_destructor() {
        let mut registry = SymbolRegistry::with_default_allocators();
        let locked = ClassId::new("Locked");
        registry
            .register_class(
                ClassEntry::class("Locked")
                    .with_method(FunctionEntry::destructor(&locked).with_access(Access::Private)),
            )
            .unwrap();
        registry.register_class(ClassEntry::forward("Opaque")).unwrap();
        let mut ctx = SemaContext::new(&registry);
        let mut builder = ExprBuilder::new(&mut ctx);

        let p = variable("p", TypeDescriptor::int().pointer_to());
        let deleted = builder.build_delete(&p, false, Span::new(1, 1, 8));
        assert_eq!(deleted.ty(), Some(&TypeDescriptor::void()));

        let n = variable("n", TypeDescriptor::int());
        assert!(builder.build_delete(&n, false, Span::new(2, 1, 8)).is_error());

        let l = variable("l", TypeDescriptor::class(locked).pointer_to());
        assert!(builder.build_delete(&l, false, Span::new(3, 1, 8)).is_error());

        let o = variable("o", TypeDescriptor::class(ClassId::new("Opaque")).pointer_to());
        assert!(!builder.build_delete(&o, true, Span::new(4, 1, 10)).is_error());
        assert_eq!(ctx.diagnostics().error_count(), 2);
        assert_eq!(ctx.diagnostics().warning_count(), 1);
    }

}
