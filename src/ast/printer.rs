use super::nodes::*;
use super::Ast;

/// Renders a (possibly transformed) AST back to Java source text.
///
/// Output is re-parseable but not byte-identical to the original input:
/// formatting is normalized to the printer's own indentation. Cast operands
/// that would bind differently without grouping are parenthesized so the
/// printed text preserves the tree's structure.
pub struct SourcePrinter {
    indent_level: usize,
    output: String,
}

impl SourcePrinter {
    pub fn new() -> Self {
        Self {
            indent_level: 0,
            output: String::new(),
        }
    }

    pub fn print(&mut self, ast: &Ast) -> String {
        self.output.clear();

        if let Some(ref package) = ast.package_decl {
            self.writeln(&format!("package {};", package.name));
            self.output.push('\n');
        }

        for import in &ast.imports {
            self.print_import(import);
        }
        if !ast.imports.is_empty() {
            self.output.push('\n');
        }

        for type_decl in &ast.type_decls {
            self.print_type_decl(type_decl);
        }

        self.output.clone()
    }

    fn indent(&mut self) {
        self.indent_level += 4;
    }

    fn dedent(&mut self) {
        if self.indent_level >= 4 {
            self.indent_level -= 4;
        }
    }

    fn write_indent(&mut self) {
        for _ in 0..self.indent_level {
            self.output.push(' ');
        }
    }

    fn writeln(&mut self, s: &str) {
        self.write_indent();
        self.output.push_str(s);
        self.output.push('\n');
    }

    fn print_import(&mut self, import: &ImportDecl) {
        let mut import_str = String::new();
        if import.is_static {
            import_str.push_str("import static ");
        } else {
            import_str.push_str("import ");
        }

        if import.is_wildcard {
            import_str.push_str(&format!("{}.*;", import.name));
        } else {
            import_str.push_str(&format!("{};", import.name));
        }

        self.writeln(&import_str);
    }

    fn print_modifiers(&mut self, modifiers: &[Modifier]) {
        for modifier in modifiers {
            self.output.push_str(modifier.as_str());
            self.output.push(' ');
        }
    }

    fn print_annotations_above(&mut self, annotations: &[Annotation]) {
        for annotation in annotations {
            self.write_indent();
            self.print_annotation(annotation);
            self.output.push('\n');
        }
    }

    fn print_annotation(&mut self, annotation: &Annotation) {
        self.output.push('@');
        self.output.push_str(&annotation.name);

        if !annotation.arguments.is_empty() {
            self.output.push('(');
            for (i, arg) in annotation.arguments.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                match arg {
                    AnnotationArg::Value(expr) => self.print_expr(expr),
                    AnnotationArg::Named(name, expr) => {
                        self.output.push_str(name);
                        self.output.push_str(" = ");
                        self.print_expr(expr);
                    }
                }
            }
            self.output.push(')');
        }
    }

    fn print_type_decl(&mut self, type_decl: &TypeDecl) {
        match type_decl {
            TypeDecl::Class(c) => self.print_class_decl(c),
            TypeDecl::Interface(i) => self.print_interface_decl(i),
            TypeDecl::Enum(e) => self.print_enum_decl(e),
            TypeDecl::Annotation(a) => self.print_annotation_decl(a),
        }
    }

    fn print_class_decl(&mut self, class: &ClassDecl) {
        self.print_annotations_above(&class.annotations);
        self.write_indent();
        self.print_modifiers(&class.modifiers);
        self.output.push_str("class ");
        self.output.push_str(&class.name);
        self.print_type_params(&class.type_params);

        if let Some(ref extends) = class.extends {
            self.output.push_str(" extends ");
            self.print_type_ref(extends);
        }

        if !class.implements.is_empty() {
            self.output.push_str(" implements ");
            for (i, implements) in class.implements.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.print_type_ref(implements);
            }
        }

        self.output.push_str(" {\n");
        self.indent();
        self.print_class_members(&class.body);
        self.dedent();
        self.writeln("}");
    }

    fn print_class_members(&mut self, members: &[ClassMember]) {
        for member in members {
            match member {
                ClassMember::Field(f) => self.print_field_decl(f),
                ClassMember::Method(m) => self.print_method_decl(m),
                ClassMember::Constructor(c) => self.print_constructor_decl(c),
                ClassMember::Initializer(i) => self.print_initializer_block(i),
                ClassMember::Type(t) => self.print_type_decl(t),
            }
        }
    }

    fn print_interface_decl(&mut self, interface: &InterfaceDecl) {
        self.print_annotations_above(&interface.annotations);
        self.write_indent();
        self.print_modifiers(&interface.modifiers);
        self.output.push_str("interface ");
        self.output.push_str(&interface.name);
        self.print_type_params(&interface.type_params);

        if !interface.extends.is_empty() {
            self.output.push_str(" extends ");
            for (i, extends) in interface.extends.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.print_type_ref(extends);
            }
        }

        self.output.push_str(" {\n");
        self.indent();
        for member in &interface.body {
            match member {
                InterfaceMember::Method(m) => self.print_method_decl(m),
                InterfaceMember::Field(f) => self.print_field_decl(f),
                InterfaceMember::Type(t) => self.print_type_decl(t),
            }
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_enum_decl(&mut self, enum_decl: &EnumDecl) {
        self.print_annotations_above(&enum_decl.annotations);
        self.write_indent();
        self.print_modifiers(&enum_decl.modifiers);
        self.output.push_str("enum ");
        self.output.push_str(&enum_decl.name);

        if !enum_decl.implements.is_empty() {
            self.output.push_str(" implements ");
            for (i, imp) in enum_decl.implements.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.print_type_ref(imp);
            }
        }

        self.output.push_str(" {\n");
        self.indent();

        if !enum_decl.constants.is_empty() {
            self.write_indent();
            for (i, constant) in enum_decl.constants.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.output.push_str(&constant.name);
                if !constant.arguments.is_empty() {
                    self.output.push('(');
                    for (j, arg) in constant.arguments.iter().enumerate() {
                        if j > 0 {
                            self.output.push_str(", ");
                        }
                        self.print_expr(arg);
                    }
                    self.output.push(')');
                }
                if let Some(ref body) = constant.body {
                    self.output.push_str(" {\n");
                    self.indent();
                    self.print_class_members(body);
                    self.dedent();
                    self.write_indent();
                    self.output.push('}');
                }
            }
            self.output.push_str(";\n");
        }

        self.print_class_members(&enum_decl.body);

        self.dedent();
        self.writeln("}");
    }

    fn print_annotation_decl(&mut self, annotation: &AnnotationDecl) {
        self.print_annotations_above(&annotation.annotations);
        self.write_indent();
        self.print_modifiers(&annotation.modifiers);
        self.output.push_str("@interface ");
        self.output.push_str(&annotation.name);
        self.output.push_str(" {\n");
        self.indent();
        for member in &annotation.body {
            self.write_indent();
            self.print_type_ref(&member.type_ref);
            self.output.push(' ');
            self.output.push_str(&member.name);
            self.output.push_str("()");
            if let Some(ref default_value) = member.default_value {
                self.output.push_str(" default ");
                self.print_expr(default_value);
            }
            self.output.push_str(";\n");
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_field_decl(&mut self, field: &FieldDecl) {
        self.print_annotations_above(&field.annotations);
        self.write_indent();
        self.print_modifiers(&field.modifiers);
        self.print_type_ref(&field.type_ref);
        self.output.push(' ');
        self.print_declarators(&field.variables);
        self.output.push_str(";\n");
    }

    fn print_declarators(&mut self, variables: &[VariableDeclarator]) {
        for (i, var) in variables.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&var.name);
            for _ in 0..var.array_dims {
                self.output.push_str("[]");
            }
            if let Some(ref initializer) = var.initializer {
                self.output.push_str(" = ");
                self.print_expr(initializer);
            }
        }
    }

    fn print_method_decl(&mut self, method: &MethodDecl) {
        self.print_annotations_above(&method.annotations);
        self.write_indent();
        self.print_modifiers(&method.modifiers);

        if !method.type_params.is_empty() {
            self.print_type_params(&method.type_params);
            self.output.push(' ');
        }

        if let Some(ref return_type) = method.return_type {
            self.print_type_ref(return_type);
        } else {
            self.output.push_str("void");
        }
        self.output.push(' ');
        self.output.push_str(&method.name);

        self.print_parameter_list(&method.parameters);
        self.print_throws(&method.throws);

        if let Some(ref body) = method.body {
            self.output.push_str(" ");
            self.print_block_braced(body);
        } else {
            self.output.push_str(";\n");
        }
    }

    fn print_constructor_decl(&mut self, constructor: &ConstructorDecl) {
        self.print_annotations_above(&constructor.annotations);
        self.write_indent();
        self.print_modifiers(&constructor.modifiers);
        self.output.push_str(&constructor.name);
        self.print_parameter_list(&constructor.parameters);
        self.print_throws(&constructor.throws);
        self.output.push(' ');
        self.print_block_braced(&constructor.body);
    }

    fn print_initializer_block(&mut self, initializer: &InitializerBlock) {
        self.write_indent();
        self.print_modifiers(&initializer.modifiers);
        self.print_block_braced(&initializer.body);
    }

    fn print_parameter_list(&mut self, parameters: &[Parameter]) {
        self.output.push('(');
        for (i, param) in parameters.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print_parameter(param);
        }
        self.output.push(')');
    }

    fn print_parameter(&mut self, parameter: &Parameter) {
        self.print_modifiers(&parameter.modifiers);
        for annotation in &parameter.annotations {
            self.print_annotation(annotation);
            self.output.push(' ');
        }
        self.print_type_ref(&parameter.type_ref);
        if parameter.varargs {
            self.output.push_str("...");
        }
        self.output.push(' ');
        self.output.push_str(&parameter.name);
    }

    fn print_throws(&mut self, throws: &[TypeRef]) {
        if !throws.is_empty() {
            self.output.push_str(" throws ");
            for (i, thrown) in throws.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                self.print_type_ref(thrown);
            }
        }
    }

    /// Print `{ ... }` with the opening brace at the current position.
    fn print_block_braced(&mut self, block: &Block) {
        self.output.push_str("{\n");
        self.indent();
        for stmt in &block.statements {
            self.print_stmt(stmt);
        }
        self.dedent();
        self.writeln("}");
    }

    fn print_stmt(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Expression(expr_stmt) => {
                self.write_indent();
                self.print_expr(&expr_stmt.expr);
                self.output.push_str(";\n");
            }
            Stmt::Declaration(var_decl) => {
                self.write_indent();
                self.print_var_decl_inline(var_decl);
                self.output.push_str(";\n");
            }
            Stmt::TypeDecl(type_decl) => {
                self.print_type_decl(type_decl);
            }
            Stmt::If(if_stmt) => {
                self.write_indent();
                self.output.push_str("if (");
                self.print_expr(&if_stmt.condition);
                self.output.push_str(") ");
                self.print_substatement(&if_stmt.then_branch);
                if let Some(ref else_branch) = if_stmt.else_branch {
                    self.write_indent();
                    self.output.push_str("else ");
                    self.print_substatement(else_branch);
                }
            }
            Stmt::While(while_stmt) => {
                self.write_indent();
                self.output.push_str("while (");
                self.print_expr(&while_stmt.condition);
                self.output.push_str(") ");
                self.print_substatement(&while_stmt.body);
            }
            Stmt::DoWhile(do_while) => {
                self.write_indent();
                self.output.push_str("do ");
                self.print_substatement(&do_while.body);
                self.write_indent();
                self.output.push_str("while (");
                self.print_expr(&do_while.condition);
                self.output.push_str(");\n");
            }
            Stmt::For(for_stmt) => {
                self.write_indent();
                self.output.push_str("for (");
                for (i, init) in for_stmt.init.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    match init {
                        Stmt::Declaration(decl) => self.print_var_decl_inline(decl),
                        Stmt::Expression(expr_stmt) => self.print_expr(&expr_stmt.expr),
                        _ => {}
                    }
                }
                self.output.push_str("; ");
                if let Some(ref condition) = for_stmt.condition {
                    self.print_expr(condition);
                }
                self.output.push_str("; ");
                for (i, update) in for_stmt.update.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_expr(&update.expr);
                }
                self.output.push_str(") ");
                self.print_substatement(&for_stmt.body);
            }
            Stmt::ForEach(for_each) => {
                self.write_indent();
                self.output.push_str("for (");
                self.print_modifiers(&for_each.modifiers);
                for annotation in &for_each.annotations {
                    self.print_annotation(annotation);
                    self.output.push(' ');
                }
                self.print_type_ref(&for_each.type_ref);
                self.output.push(' ');
                self.output.push_str(&for_each.name);
                self.output.push_str(" : ");
                self.print_expr(&for_each.iterable);
                self.output.push_str(") ");
                self.print_substatement(&for_each.body);
            }
            Stmt::Switch(switch_stmt) => {
                self.write_indent();
                self.output.push_str("switch (");
                self.print_expr(&switch_stmt.expression);
                self.output.push_str(") {\n");
                self.indent();
                for case in &switch_stmt.cases {
                    if case.labels.is_empty() {
                        self.writeln("default:");
                    } else {
                        for label in &case.labels {
                            self.write_indent();
                            self.output.push_str("case ");
                            self.print_expr(label);
                            self.output.push_str(":\n");
                        }
                    }
                    self.indent();
                    for stmt in &case.statements {
                        self.print_stmt(stmt);
                    }
                    self.dedent();
                }
                self.dedent();
                self.writeln("}");
            }
            Stmt::Return(return_stmt) => {
                self.write_indent();
                self.output.push_str("return");
                if let Some(ref value) = return_stmt.value {
                    self.output.push(' ');
                    self.print_expr(value);
                }
                self.output.push_str(";\n");
            }
            Stmt::Break(break_stmt) => {
                self.write_indent();
                self.output.push_str("break");
                if let Some(ref label) = break_stmt.label {
                    self.output.push(' ');
                    self.output.push_str(label);
                }
                self.output.push_str(";\n");
            }
            Stmt::Continue(continue_stmt) => {
                self.write_indent();
                self.output.push_str("continue");
                if let Some(ref label) = continue_stmt.label {
                    self.output.push(' ');
                    self.output.push_str(label);
                }
                self.output.push_str(";\n");
            }
            Stmt::Try(try_stmt) => {
                self.write_indent();
                if !try_stmt.resources.is_empty() {
                    self.output.push_str("try (");
                    for (i, resource) in try_stmt.resources.iter().enumerate() {
                        if i > 0 {
                            self.output.push_str("; ");
                        }
                        match resource {
                            TryResource::Var {
                                modifiers,
                                type_ref,
                                name,
                                initializer,
                                ..
                            } => {
                                self.print_modifiers(modifiers);
                                self.print_type_ref(type_ref);
                                self.output.push(' ');
                                self.output.push_str(name);
                                self.output.push_str(" = ");
                                self.print_expr(initializer);
                            }
                            TryResource::Expr { expr, .. } => {
                                self.print_expr(expr);
                            }
                        }
                    }
                    self.output.push_str(") ");
                } else {
                    self.output.push_str("try ");
                }
                self.print_block_braced(&try_stmt.try_block);

                for catch in &try_stmt.catch_clauses {
                    self.write_indent();
                    self.output.push_str("catch (");
                    self.print_modifiers(&catch.parameter.modifiers);
                    self.print_type_ref(&catch.parameter.type_ref);
                    for alt in &catch.alt_types {
                        self.output.push_str(" | ");
                        self.print_type_ref(alt);
                    }
                    self.output.push(' ');
                    self.output.push_str(&catch.parameter.name);
                    self.output.push_str(") ");
                    self.print_block_braced(&catch.block);
                }

                if let Some(ref finally_block) = try_stmt.finally_block {
                    self.write_indent();
                    self.output.push_str("finally ");
                    self.print_block_braced(finally_block);
                }
            }
            Stmt::Throw(throw_stmt) => {
                self.write_indent();
                self.output.push_str("throw ");
                self.print_expr(&throw_stmt.expr);
                self.output.push_str(";\n");
            }
            Stmt::Assert(assert_stmt) => {
                self.write_indent();
                self.output.push_str("assert ");
                self.print_expr(&assert_stmt.condition);
                if let Some(ref message) = assert_stmt.message {
                    self.output.push_str(" : ");
                    self.print_expr(message);
                }
                self.output.push_str(";\n");
            }
            Stmt::Synchronized(sync_stmt) => {
                self.write_indent();
                self.output.push_str("synchronized (");
                self.print_expr(&sync_stmt.lock);
                self.output.push_str(") ");
                self.print_block_braced(&sync_stmt.body);
            }
            Stmt::Labeled(labeled_stmt) => {
                self.write_indent();
                self.output.push_str(&labeled_stmt.label);
                self.output.push_str(": ");
                self.print_substatement(&labeled_stmt.statement);
            }
            Stmt::Block(block) => {
                self.write_indent();
                self.print_block_braced(block);
            }
            Stmt::Empty => {
                self.writeln(";");
            }
        }
    }

    /// Print the body of a control statement: blocks open on the same line,
    /// other statements go on their own line.
    fn print_substatement(&mut self, stmt: &Stmt) {
        match stmt {
            Stmt::Block(block) => self.print_block_braced(block),
            other => {
                self.output.push('\n');
                self.indent();
                self.print_stmt(other);
                self.dedent();
            }
        }
    }

    fn print_var_decl_inline(&mut self, var_decl: &VarDeclStmt) {
        self.print_modifiers(&var_decl.modifiers);
        for annotation in &var_decl.annotations {
            self.print_annotation(annotation);
            self.output.push(' ');
        }
        self.print_type_ref(&var_decl.type_ref);
        self.output.push(' ');
        self.print_declarators(&var_decl.variables);
    }

    fn print_expr(&mut self, expr: &Expr) {
        match expr {
            Expr::Literal(literal) => self.print_literal(literal),
            Expr::Identifier(identifier) => self.output.push_str(&identifier.name),
            Expr::Binary(binary) => {
                self.print_expr(&binary.left);
                self.output.push(' ');
                self.output.push_str(binary.operator.as_str());
                self.output.push(' ');
                self.print_expr(&binary.right);
            }
            Expr::Unary(unary) => {
                if unary.operator.is_postfix() {
                    self.print_expr(&unary.operand);
                    self.output.push_str(unary.operator.as_str());
                } else {
                    self.output.push_str(unary.operator.as_str());
                    self.print_expr(&unary.operand);
                }
            }
            Expr::Assignment(assignment) => {
                self.print_expr(&assignment.target);
                self.output.push(' ');
                self.output.push_str(assignment.operator.as_str());
                self.output.push(' ');
                self.print_expr(&assignment.value);
            }
            Expr::MethodCall(method_call) => {
                if let Some(ref target) = method_call.target {
                    self.print_expr(target);
                    self.output.push('.');
                }
                self.output.push_str(&method_call.name);
                self.output.push('(');
                for (i, arg) in method_call.arguments.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_expr(arg);
                }
                self.output.push(')');
            }
            Expr::FieldAccess(field_access) => {
                if let Some(ref target) = field_access.target {
                    self.print_expr(target);
                    self.output.push('.');
                }
                self.output.push_str(&field_access.name);
            }
            Expr::ArrayAccess(array_access) => {
                self.print_expr(&array_access.array);
                self.output.push('[');
                self.print_expr(&array_access.index);
                self.output.push(']');
            }
            Expr::Cast(cast) => {
                self.output.push('(');
                self.print_type_ref(&cast.target_type);
                self.output.push_str(") ");
                // Grouping must survive the round trip: a cast binds tighter
                // than any binary or conditional operator in its operand.
                if cast_operand_needs_parens(&cast.expr) {
                    self.output.push('(');
                    self.print_expr(&cast.expr);
                    self.output.push(')');
                } else {
                    self.print_expr(&cast.expr);
                }
            }
            Expr::InstanceOf(instance_of) => {
                self.print_expr(&instance_of.expr);
                self.output.push_str(" instanceof ");
                self.print_type_ref(&instance_of.target_type);
            }
            Expr::Conditional(conditional) => {
                self.print_expr(&conditional.condition);
                self.output.push_str(" ? ");
                self.print_expr(&conditional.then_expr);
                self.output.push_str(" : ");
                self.print_expr(&conditional.else_expr);
            }
            Expr::New(new_expr) => {
                self.output.push_str("new ");
                self.print_type_ref(&new_expr.target_type);
                self.output.push('(');
                for (i, arg) in new_expr.arguments.iter().enumerate() {
                    if i > 0 {
                        self.output.push_str(", ");
                    }
                    self.print_expr(arg);
                }
                self.output.push(')');
                if let Some(ref body) = new_expr.anonymous_body {
                    self.output.push_str(" {\n");
                    self.indent();
                    self.print_class_members(body);
                    self.dedent();
                    self.write_indent();
                    self.output.push('}');
                }
            }
            Expr::NewArray(new_array) => {
                self.output.push_str("new ");
                self.print_type_ref(&new_array.element_type);
                for dim in &new_array.dim_exprs {
                    self.output.push('[');
                    self.print_expr(dim);
                    self.output.push(']');
                }
                for _ in 0..new_array.extra_dims {
                    self.output.push_str("[]");
                }
                if let Some(ref initializer) = new_array.initializer {
                    self.output.push(' ');
                    self.print_array_initializer(initializer);
                }
            }
            Expr::Lambda(lambda) => self.print_lambda(lambda),
            Expr::MethodReference(method_ref) => {
                self.print_expr(&method_ref.target);
                self.output.push_str("::");
                if method_ref.is_constructor {
                    self.output.push_str("new");
                } else {
                    self.output.push_str(&method_ref.method_name);
                }
            }
            Expr::Parenthesized(inner, _) => {
                self.output.push('(');
                self.print_expr(inner);
                self.output.push(')');
            }
            Expr::ArrayInitializer(values, _) => {
                self.print_array_initializer(values);
            }
        }
    }

    fn print_array_initializer(&mut self, values: &[Expr]) {
        self.output.push('{');
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print_expr(value);
        }
        self.output.push('}');
    }

    fn print_lambda(&mut self, lambda: &LambdaExpr) {
        if lambda.parameters.len() == 1 && lambda.parameters[0].type_ref.is_none() {
            self.output.push_str(&lambda.parameters[0].name);
        } else {
            self.output.push('(');
            for (i, param) in lambda.parameters.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                if let Some(ref type_ref) = param.type_ref {
                    self.print_type_ref(type_ref);
                    self.output.push(' ');
                }
                self.output.push_str(&param.name);
            }
            self.output.push(')');
        }

        self.output.push_str(" -> ");

        match &lambda.body {
            LambdaBody::Expression(expr) => self.print_expr(expr),
            LambdaBody::Block(block) => self.print_block_braced(block),
        }
    }

    fn print_literal(&mut self, literal: &LiteralExpr) {
        match &literal.value {
            Literal::Integer(i) => self.output.push_str(&i.to_string()),
            Literal::Long(l) => {
                self.output.push_str(&l.to_string());
                self.output.push('L');
            }
            Literal::Float(f) => {
                let text = f.to_string();
                self.output.push_str(&text);
                self.output.push('f');
            }
            Literal::Double(d) => {
                let text = d.to_string();
                self.output.push_str(&text);
                if !text.contains('.') && !text.contains('e') && !text.contains('E') {
                    self.output.push_str(".0");
                }
            }
            Literal::Boolean(b) => self.output.push_str(&b.to_string()),
            Literal::String(s) => {
                self.output.push('"');
                self.output.push_str(s);
                self.output.push('"');
            }
            Literal::Char(c) => {
                self.output.push('\'');
                self.output.push_str(c);
                self.output.push('\'');
            }
            Literal::Null => self.output.push_str("null"),
        }
    }

    fn print_type_ref(&mut self, type_ref: &TypeRef) {
        self.output.push_str(&type_ref.name);

        if let Some(ref type_args) = type_ref.type_args {
            self.output.push('<');
            for (i, arg) in type_args.iter().enumerate() {
                if i > 0 {
                    self.output.push_str(", ");
                }
                match arg {
                    TypeArg::Type(t) => self.print_type_ref(t),
                    TypeArg::Wildcard(w) => {
                        self.output.push('?');
                        if let Some((bound_kind, bound_type)) = &w.bound {
                            match bound_kind {
                                BoundKind::Extends => self.output.push_str(" extends "),
                                BoundKind::Super => self.output.push_str(" super "),
                            }
                            self.print_type_ref(bound_type);
                        }
                    }
                }
            }
            self.output.push('>');
        }

        for _ in 0..type_ref.array_dims {
            self.output.push_str("[]");
        }
    }

    fn print_type_params(&mut self, type_params: &[TypeParam]) {
        if type_params.is_empty() {
            return;
        }
        self.output.push('<');
        for (i, param) in type_params.iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.output.push_str(&param.name);
            if !param.bounds.is_empty() {
                self.output.push_str(" extends ");
                for (j, bound) in param.bounds.iter().enumerate() {
                    if j > 0 {
                        self.output.push_str(" & ");
                    }
                    self.print_type_ref(bound);
                }
            }
        }
        self.output.push('>');
    }
}

impl Default for SourcePrinter {
    fn default() -> Self {
        Self::new()
    }
}

/// A cast operand whose top-level operator binds looser than a cast would
/// re-associate if printed bare: `(int) a + b` is not `(int) (a + b)`.
fn cast_operand_needs_parens(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Binary(_)
            | Expr::Conditional(_)
            | Expr::Assignment(_)
            | Expr::InstanceOf(_)
            | Expr::Lambda(_)
    )
}
