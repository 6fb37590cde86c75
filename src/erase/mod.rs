//! The erasure pass: scope-tracked type rewriting plus call-site cast
//! reinsertion
//!
//! One depth-first traversal over the compilation unit. Local variable
//! declarations are rewritten to the universal top type, with their original
//! type recorded in a per-method binding map and reasserted as a cast around
//! the initializer. Plain `name = someCall(...)` assignments to a tracked
//! variable get the same cast wrapped around the call. Every node kind the
//! pass does not target is traversed or passed through unchanged.

pub mod scope;

use crate::ast::*;
use crate::config::Config;
use crate::error::Result;
use scope::TypeBindings;

/// The erasure pass processor.
///
/// Each instance owns its binding map, so separate transformations are fully
/// independent; run `process` once per compilation unit.
pub struct TypeEraser {
    top_type: String,
    bindings: TypeBindings,
}

impl TypeEraser {
    pub fn new(config: &Config) -> Self {
        Self {
            top_type: config.top_type.clone(),
            bindings: TypeBindings::new(),
        }
    }

    /// Run the erasure pass over a compilation unit.
    ///
    /// Total over any syntactically valid tree: the pass itself raises no
    /// errors.
    pub fn process(&mut self, mut ast: Ast) -> Result<Ast> {
        for type_decl in &mut ast.type_decls {
            self.erase_type_decl(type_decl);
        }
        Ok(ast)
    }

    fn top_type_ref(&self, span: Span) -> TypeRef {
        TypeRef {
            name: self.top_type.clone(),
            type_args: None,
            array_dims: 0,
            span,
        }
    }

    fn erase_type_decl(&mut self, type_decl: &mut TypeDecl) {
        match type_decl {
            TypeDecl::Class(class) => self.erase_class_members(&mut class.body),
            TypeDecl::Interface(interface) => {
                for member in &mut interface.body {
                    match member {
                        InterfaceMember::Method(method) => self.erase_method(method),
                        InterfaceMember::Field(field) => self.erase_field(field),
                        InterfaceMember::Type(nested) => self.erase_type_decl(nested),
                    }
                }
            }
            TypeDecl::Enum(enum_decl) => {
                for constant in &mut enum_decl.constants {
                    for arg in &mut constant.arguments {
                        self.erase_expression(arg);
                    }
                    if let Some(ref mut body) = constant.body {
                        self.erase_class_members(body);
                    }
                }
                self.erase_class_members(&mut enum_decl.body);
            }
            TypeDecl::Annotation(annotation) => {
                for member in &mut annotation.body {
                    if let Some(ref mut default_value) = member.default_value {
                        self.erase_expression(default_value);
                    }
                }
            }
        }
    }

    fn erase_class_members(&mut self, members: &mut Vec<ClassMember>) {
        for member in members {
            match member {
                ClassMember::Field(field) => self.erase_field(field),
                ClassMember::Method(method) => self.erase_method(method),
                ClassMember::Constructor(constructor) => {
                    // Constructors do not open a scope of their own; their
                    // declarations land in the enclosing map
                    self.erase_block(&mut constructor.body);
                }
                ClassMember::Initializer(initializer) => self.erase_block(&mut initializer.body),
                ClassMember::Type(nested) => self.erase_type_decl(nested),
            }
        }
    }

    /// Fields keep their declared type; only their initializer expressions
    /// are traversed.
    fn erase_field(&mut self, field: &mut FieldDecl) {
        for variable in &mut field.variables {
            if let Some(ref mut initializer) = variable.initializer {
                self.erase_expression(initializer);
            }
        }
    }

    /// Method declarations delimit scope boundaries: the enclosing binding
    /// map is snapshotted, a fresh map covers the whole method subtree
    /// (nested blocks, lambdas, and local classes included), and the
    /// snapshot is restored on the way out.
    fn erase_method(&mut self, method: &mut MethodDecl) {
        let saved = self.bindings.enter_method();
        if let Some(ref mut body) = method.body {
            self.erase_block(body);
        }
        self.bindings.leave_method(saved);
    }

    fn erase_block(&mut self, block: &mut Block) {
        for stmt in &mut block.statements {
            self.erase_statement(stmt);
        }
    }

    fn erase_statement(&mut self, stmt: &mut Stmt) {
        match stmt {
            Stmt::Expression(expr_stmt) => self.erase_expression(&mut expr_stmt.expr),
            Stmt::Declaration(var_decl) => self.erase_local_decl(var_decl),
            Stmt::TypeDecl(type_decl) => self.erase_type_decl(type_decl),
            Stmt::If(if_stmt) => {
                self.erase_expression(&mut if_stmt.condition);
                self.erase_statement(&mut if_stmt.then_branch);
                if let Some(ref mut else_branch) = if_stmt.else_branch {
                    self.erase_statement(else_branch);
                }
            }
            Stmt::While(while_stmt) => {
                self.erase_expression(&mut while_stmt.condition);
                self.erase_statement(&mut while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.erase_statement(&mut do_while.body);
                self.erase_expression(&mut do_while.condition);
            }
            Stmt::For(for_stmt) => {
                for init in &mut for_stmt.init {
                    self.erase_statement(init);
                }
                if let Some(ref mut condition) = for_stmt.condition {
                    self.erase_expression(condition);
                }
                for update in &mut for_stmt.update {
                    self.erase_expression(&mut update.expr);
                }
                self.erase_statement(&mut for_stmt.body);
            }
            Stmt::ForEach(for_each) => {
                // The loop variable is a local declaration without an
                // initializer: record and erase, nothing to cast
                self.bindings
                    .record(for_each.name.clone(), for_each.type_ref.clone());
                for_each.type_ref = self.top_type_ref(for_each.type_ref.span);
                self.erase_expression(&mut for_each.iterable);
                self.erase_statement(&mut for_each.body);
            }
            Stmt::Switch(switch_stmt) => {
                self.erase_expression(&mut switch_stmt.expression);
                for case in &mut switch_stmt.cases {
                    for label in &mut case.labels {
                        self.erase_expression(label);
                    }
                    for stmt in &mut case.statements {
                        self.erase_statement(stmt);
                    }
                }
            }
            Stmt::Return(return_stmt) => {
                if let Some(ref mut value) = return_stmt.value {
                    self.erase_expression(value);
                }
            }
            Stmt::Try(try_stmt) => {
                for resource in &mut try_stmt.resources {
                    self.erase_try_resource(resource);
                }
                self.erase_block(&mut try_stmt.try_block);
                for catch in &mut try_stmt.catch_clauses {
                    self.erase_block(&mut catch.block);
                }
                if let Some(ref mut finally_block) = try_stmt.finally_block {
                    self.erase_block(finally_block);
                }
            }
            Stmt::Throw(throw_stmt) => self.erase_expression(&mut throw_stmt.expr),
            Stmt::Assert(assert_stmt) => {
                self.erase_expression(&mut assert_stmt.condition);
                if let Some(ref mut message) = assert_stmt.message {
                    self.erase_expression(message);
                }
            }
            Stmt::Synchronized(sync_stmt) => {
                self.erase_expression(&mut sync_stmt.lock);
                self.erase_block(&mut sync_stmt.body);
            }
            Stmt::Labeled(labeled_stmt) => self.erase_statement(&mut labeled_stmt.statement),
            Stmt::Block(block) => self.erase_block(block),
            Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty => {}
        }
    }

    /// The heart of the rewriter: for each declarator, record its full
    /// original type, wrap any initializer in a cast back to it, and erase
    /// the declared type to the top type.
    fn erase_local_decl(&mut self, var_decl: &mut VarDeclStmt) {
        for variable in &mut var_decl.variables {
            // The recorded type is the statement's base type plus any dims
            // written after the declarator name: `int x[]` binds `int[]`
            let mut original = var_decl.type_ref.clone();
            original.array_dims += variable.array_dims;

            if let Some(initializer) = variable.initializer.take() {
                let span = initializer.span();
                variable.initializer = Some(Expr::Cast(CastExpr {
                    target_type: original.clone(),
                    expr: Box::new(initializer),
                    span,
                }));
            }

            self.bindings.record(variable.name.clone(), original);
            variable.array_dims = 0;
        }
        var_decl.type_ref = self.top_type_ref(var_decl.type_ref.span);

        // Descend into the (possibly rewritten) initializer subtrees
        for variable in &mut var_decl.variables {
            if let Some(ref mut initializer) = variable.initializer {
                self.erase_expression(initializer);
            }
        }
    }

    fn erase_try_resource(&mut self, resource: &mut TryResource) {
        match resource {
            TryResource::Var {
                type_ref,
                name,
                initializer,
                ..
            } => {
                let original = type_ref.clone();
                let span = initializer.span();
                let inner = std::mem::replace(
                    initializer,
                    Expr::Literal(LiteralExpr {
                        value: Literal::Null,
                        span,
                    }),
                );
                *initializer = Expr::Cast(CastExpr {
                    target_type: original.clone(),
                    expr: Box::new(inner),
                    span,
                });
                self.bindings.record(name.clone(), original);
                *type_ref = self.top_type_ref(type_ref.span);
                self.erase_expression(initializer);
            }
            TryResource::Expr { expr, .. } => self.erase_expression(expr),
        }
    }

    fn erase_expression(&mut self, expr: &mut Expr) {
        match expr {
            Expr::Assignment(assign) => {
                // Call-site cast reinsertion: a plain `=` to a bare tracked
                // name whose value is directly a method call gets the
                // recorded type reasserted around the call
                if assign.operator == AssignmentOp::Assign {
                    if let (Expr::Identifier(target), Expr::MethodCall(_)) =
                        (assign.target.as_ref(), assign.value.as_ref())
                    {
                        if let Some(original) = self.bindings.lookup(&target.name).cloned() {
                            wrap_in_cast(assign.value.as_mut(), original);
                        }
                    }
                }
                self.erase_expression(&mut assign.target);
                self.erase_expression(&mut assign.value);
            }
            Expr::Binary(binary) => {
                self.erase_expression(&mut binary.left);
                self.erase_expression(&mut binary.right);
            }
            Expr::Unary(unary) => self.erase_expression(&mut unary.operand),
            Expr::MethodCall(method_call) => {
                if let Some(ref mut target) = method_call.target {
                    self.erase_expression(target);
                }
                for arg in &mut method_call.arguments {
                    self.erase_expression(arg);
                }
            }
            Expr::FieldAccess(field_access) => {
                if let Some(ref mut target) = field_access.target {
                    self.erase_expression(target);
                }
            }
            Expr::ArrayAccess(array_access) => {
                self.erase_expression(&mut array_access.array);
                self.erase_expression(&mut array_access.index);
            }
            Expr::Cast(cast) => self.erase_expression(&mut cast.expr),
            Expr::InstanceOf(instance_of) => self.erase_expression(&mut instance_of.expr),
            Expr::Conditional(conditional) => {
                self.erase_expression(&mut conditional.condition);
                self.erase_expression(&mut conditional.then_expr);
                self.erase_expression(&mut conditional.else_expr);
            }
            Expr::New(new_expr) => {
                for arg in &mut new_expr.arguments {
                    self.erase_expression(arg);
                }
                if let Some(ref mut body) = new_expr.anonymous_body {
                    self.erase_class_members(body);
                }
            }
            Expr::NewArray(new_array) => {
                for dim in &mut new_array.dim_exprs {
                    self.erase_expression(dim);
                }
                if let Some(ref mut initializer) = new_array.initializer {
                    for value in initializer {
                        self.erase_expression(value);
                    }
                }
            }
            Expr::Lambda(lambda) => match &mut lambda.body {
                // Lambda bodies share the enclosing method's flat map
                LambdaBody::Expression(body) => self.erase_expression(body),
                LambdaBody::Block(block) => self.erase_block(block),
            },
            Expr::Parenthesized(inner, _) => self.erase_expression(inner),
            Expr::ArrayInitializer(values, _) => {
                for value in values {
                    self.erase_expression(value);
                }
            }
            Expr::MethodReference(method_ref) => self.erase_expression(&mut method_ref.target),
            Expr::Literal(_) | Expr::Identifier(_) => {}
        }
    }
}

/// Replace `slot` with a cast of its current contents to `target_type`.
/// The original expression moves under the cast unchanged.
fn wrap_in_cast(slot: &mut Expr, target_type: TypeRef) {
    let span = slot.span();
    let inner = std::mem::replace(
        slot,
        Expr::Literal(LiteralExpr {
            value: Literal::Null,
            span,
        }),
    );
    *slot = Expr::Cast(CastExpr {
        target_type,
        expr: Box::new(inner),
        span,
    });
}
