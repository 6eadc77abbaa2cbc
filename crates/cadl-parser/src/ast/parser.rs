//! Recovering recursive-descent parser for Cadl.
//!
//! Grammar (informal):
//!
//! ```text
//! SCRIPT     := (IMPORT | ITEM)*
//! IMPORT     := 'import' STRING ';'
//! ITEM       := 'using' PATH ';'
//!             | DECORATOR* ('namespace' NAMESPACE | 'model' MODEL | 'op' OPERATION | 'interface' INTERFACE)
//! NAMESPACE  := PATH ('{' ITEM* '}' | ';')
//! MODEL      := IDENT TEMPLATE? ('is' TYPE | 'extends' TYPE)? ('{' MEMBERS '}' | ';')
//! OPERATION  := IDENT TEMPLATE? SIGNATURE ';'
//! SIGNATURE  := '(' MEMBERS ')' ':' TYPE | ':' TYPE
//! INTERFACE  := IDENT '{' (DECORATOR* 'op'? OPERATION)* '}'
//! MEMBERS    := (DECORATOR* (PROPNAME '?'? ':' TYPE | '...' TYPE) (';' | ',')?)*
//! TYPE       := '|'? PRIMARY ('|' PRIMARY)*
//! PRIMARY    := (PATH ('<' TYPE (',' TYPE)* '>')? | 'void' | 'never' | '{' MEMBERS '}' | '(' TYPE ')') ('[' ']')*
//! ```
//!
//! Every syntax error becomes a diagnostic; the parser then skips to the next
//! statement boundary so the rest of the file still yields an AST.

use std::sync::Arc;

use cadl_core::{Diagnosed, Diagnostic, DiagnosticCode, Location, SourceFileId, Span};

use super::decl::*;
use super::types::*;
use super::{Ident, Script};
use crate::lexer::{Lexer, Token, TokenKind};

/// Marker returned after a syntax error has been reported.
struct Recover;

type PResult<T> = Result<T, Recover>;

pub struct Parser<'src> {
    lexer: Lexer<'src>,
    current: Token<'src>,
    previous_span: Span,
    file: SourceFileId,
    imports: Vec<ImportDecl>,
    diagnostics: Vec<Diagnostic>,
    reported_eof: bool,
}

impl<'src> Parser<'src> {
    /// Parse one file. Always returns a script, possibly partial.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(source: &'src str, file: SourceFileId) -> Diagnosed<Script> {
        let mut lexer = Lexer::new(source);
        let current = lexer.next_token();
        let mut parser = Parser {
            lexer,
            current,
            previous_span: Span::point(1, 1),
            file,
            imports: Vec::new(),
            diagnostics: Vec::new(),
            reported_eof: false,
        };

        let items = parser.parse_items(true);
        parser.flush_lex_errors();

        let script = Script {
            file,
            imports: std::mem::take(&mut parser.imports),
            items,
        };
        (script, parser.diagnostics)
    }

    // =========================================
    // Token helpers
    // =========================================

    fn advance(&mut self) -> Token<'src> {
        let token = self.current;
        self.previous_span = token.span;
        self.current = self.lexer.next_token();
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.current.kind == kind
    }

    fn eat(&mut self, kind: TokenKind) -> Option<Token<'src>> {
        if self.check(kind) {
            Some(self.advance())
        } else {
            None
        }
    }

    fn expect(&mut self, kind: TokenKind) -> PResult<Token<'src>> {
        if let Some(token) = self.eat(kind) {
            return Ok(token);
        }
        self.error_expected(kind.describe());
        Err(Recover)
    }

    fn span_from(&self, start: Span) -> Span {
        start.merge(self.previous_span)
    }

    fn report(&mut self, code: DiagnosticCode, message: String, span: Span) {
        self.flush_lex_errors();
        self.diagnostics
            .push(Diagnostic::new(code, message).at(Location::new(self.file, span)));
    }

    fn error_expected(&mut self, what: &str) {
        match self.current.kind {
            // The lexer already reported this token.
            TokenKind::Invalid => return,
            // One "found end of file" is enough.
            TokenKind::Eof if self.reported_eof => return,
            TokenKind::Eof => self.reported_eof = true,
            _ => {}
        }
        let found = match self.current.kind {
            TokenKind::Eof => "end of file".to_string(),
            _ => format!("'{}'", self.current.lexeme),
        };
        self.report(
            DiagnosticCode::TokenExpected,
            format!("{what} expected, found {found}."),
            self.current.span,
        );
    }

    /// Move lexer errors into the diagnostic list, keeping source order.
    fn flush_lex_errors(&mut self) {
        for error in self.lexer.take_errors() {
            self.diagnostics
                .push(error.to_diagnostic().at(Location::new(self.file, error.span())));
        }
    }

    /// Skip to the end of the current statement.
    ///
    /// Stops after a `;` or before a token that starts a new declaration. A
    /// `}` closing the enclosing body is left for its owner; at the top level a
    /// stray `}` is skipped.
    fn recover_statement(&mut self, top_level: bool) {
        let mut depth = 0usize;
        let mut consumed = false;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                TokenKind::Semicolon if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::OpenBrace => depth += 1,
                TokenKind::CloseBrace => {
                    if depth == 0 {
                        if top_level && !consumed {
                            self.advance();
                        }
                        return;
                    }
                    depth -= 1;
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                TokenKind::Model
                | TokenKind::Op
                | TokenKind::Interface
                | TokenKind::Namespace
                | TokenKind::Import
                | TokenKind::Using
                | TokenKind::At
                    if depth == 0 && consumed =>
                {
                    return;
                }
                _ => {}
            }
            self.advance();
            consumed = true;
        }
    }

    // =========================================
    // Items
    // =========================================

    fn parse_items(&mut self, top_level: bool) -> Vec<Item> {
        let mut items = Vec::new();
        loop {
            match self.current.kind {
                TokenKind::Eof => break,
                TokenKind::CloseBrace if !top_level => break,
                _ => {}
            }
            match self.parse_item(top_level) {
                Ok(Some(item)) => {
                    let blockless = matches!(&item, Item::Namespace(ns) if ns.blockless);
                    items.push(item);
                    if blockless {
                        break;
                    }
                }
                Ok(None) => {}
                Err(Recover) => self.recover_statement(top_level),
            }
        }
        items
    }

    fn parse_item(&mut self, top_level: bool) -> PResult<Option<Item>> {
        let start = self.current.span;
        match self.current.kind {
            TokenKind::Import => {
                self.advance();
                let path = self.expect(TokenKind::StringLiteral)?;
                self.expect(TokenKind::Semicolon)?;
                let span = self.span_from(start);
                if top_level {
                    self.imports.push(ImportDecl {
                        path: unescape(path.lexeme),
                        span,
                    });
                } else {
                    self.report(
                        DiagnosticCode::UnexpectedToken,
                        "Imports are only allowed at the top level of a file.".to_string(),
                        span,
                    );
                }
                return Ok(None);
            }
            TokenKind::Using => {
                self.advance();
                let path = self.parse_path()?;
                self.expect(TokenKind::Semicolon)?;
                return Ok(Some(Item::Using(UsingDecl {
                    path,
                    span: self.span_from(start),
                })));
            }
            TokenKind::Semicolon => {
                self.advance();
                return Ok(None);
            }
            _ => {}
        }

        let decorators = self.parse_decorators()?;
        match self.current.kind {
            TokenKind::Namespace => self.parse_namespace(decorators, start, top_level).map(Some),
            TokenKind::Model => self
                .parse_model(decorators, start)
                .map(|m| Some(Item::Model(Arc::new(m)))),
            TokenKind::Op => {
                self.advance();
                self.parse_operation(decorators, start)
                    .map(|o| Some(Item::Operation(Arc::new(o))))
            }
            TokenKind::Interface => self
                .parse_interface(decorators, start)
                .map(|i| Some(Item::Interface(Arc::new(i)))),
            _ => {
                if self.current.kind != TokenKind::Invalid {
                    let message = format!("Statement expected, found '{}'.", self.current.lexeme);
                    self.report(DiagnosticCode::UnexpectedToken, message, self.current.span);
                }
                Err(Recover)
            }
        }
    }

    fn parse_namespace(
        &mut self,
        decorators: Vec<DecoratorExpr>,
        start: Span,
        top_level: bool,
    ) -> PResult<Item> {
        self.expect(TokenKind::Namespace)?;
        let path = self.parse_path()?;

        if self.eat(TokenKind::Semicolon).is_some() {
            let header_span = self.span_from(start);
            if !top_level {
                self.report(
                    DiagnosticCode::UnexpectedToken,
                    "Blockless namespaces are only allowed at the top level of a file.".to_string(),
                    header_span,
                );
            }
            let items = self.parse_items(top_level);
            return Ok(Item::Namespace(Arc::new(NamespaceDecl {
                decorators,
                path,
                items,
                blockless: true,
                span: header_span,
            })));
        }

        self.expect(TokenKind::OpenBrace)?;
        let items = self.parse_items(false);
        self.expect(TokenKind::CloseBrace)?;
        Ok(Item::Namespace(Arc::new(NamespaceDecl {
            decorators,
            path,
            items,
            blockless: false,
            span: self.span_from(start),
        })))
    }

    fn parse_model(&mut self, decorators: Vec<DecoratorExpr>, start: Span) -> PResult<ModelDecl> {
        self.expect(TokenKind::Model)?;
        let name = self.parse_ident()?;
        let template_params = self.parse_template_params()?;

        let heritage = if self.eat(TokenKind::Is).is_some() {
            ModelHeritage::Is(self.parse_type()?)
        } else if self.eat(TokenKind::Extends).is_some() {
            ModelHeritage::Extends(self.parse_type()?)
        } else {
            ModelHeritage::None
        };

        let members = if matches!(heritage, ModelHeritage::Is(_))
            && self.eat(TokenKind::Semicolon).is_some()
        {
            Vec::new()
        } else {
            self.expect(TokenKind::OpenBrace)?;
            let members = self.parse_members(TokenKind::CloseBrace);
            self.expect(TokenKind::CloseBrace)?;
            members
        };

        Ok(ModelDecl {
            decorators,
            name,
            template_params,
            heritage,
            members,
            span: self.span_from(start),
        })
    }

    /// Parse an operation after the optional `op` keyword.
    fn parse_operation(
        &mut self,
        decorators: Vec<DecoratorExpr>,
        start: Span,
    ) -> PResult<OperationDecl> {
        let name = self.parse_ident()?;
        let template_params = self.parse_template_params()?;

        let signature = if self.check(TokenKind::OpenParen) {
            let open = self.advance().span;
            let parameters = self.parse_members(TokenKind::CloseParen);
            self.expect(TokenKind::CloseParen)?;
            let parameters_span = self.span_from(open);
            self.expect(TokenKind::Colon)?;
            let return_type = self.parse_type()?;
            OperationSignature::Declaration {
                parameters,
                parameters_span,
                return_type,
            }
        } else if self.eat(TokenKind::Colon).is_some() {
            OperationSignature::Reference(self.parse_type()?)
        } else {
            self.error_expected("'(' or ':'");
            return Err(Recover);
        };
        self.expect(TokenKind::Semicolon)?;

        Ok(OperationDecl {
            decorators,
            name,
            template_params,
            signature,
            span: self.span_from(start),
        })
    }

    fn parse_interface(
        &mut self,
        decorators: Vec<DecoratorExpr>,
        start: Span,
    ) -> PResult<InterfaceDecl> {
        self.expect(TokenKind::Interface)?;
        let name = self.parse_ident()?;
        self.expect(TokenKind::OpenBrace)?;

        let mut operations = Vec::new();
        while !self.check(TokenKind::CloseBrace) && !self.check(TokenKind::Eof) {
            let op_start = self.current.span;
            let parsed = self.parse_decorators().and_then(|decorators| {
                self.eat(TokenKind::Op);
                self.parse_operation(decorators, op_start)
            });
            match parsed {
                Ok(op) => operations.push(Arc::new(op)),
                Err(Recover) => self.recover_statement(false),
            }
        }
        self.expect(TokenKind::CloseBrace)?;

        Ok(InterfaceDecl {
            decorators,
            name,
            operations,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Members, decorators, template parameters
    // =========================================

    /// Parse model members up to (not including) `close`.
    ///
    /// A broken member is skipped on its own so the rest of the body survives.
    fn parse_members(&mut self, close: TokenKind) -> Vec<ModelMember> {
        let mut members = Vec::new();
        while !self.check(close) && !self.check(TokenKind::Eof) {
            match self.parse_member(close) {
                Ok(member) => members.push(member),
                Err(Recover) => self.recover_member(close),
            }
        }
        members
    }

    fn parse_member(&mut self, close: TokenKind) -> PResult<ModelMember> {
        let start = self.current.span;
        let member = if self.eat(TokenKind::Ellipsis).is_some() {
            let target = self.parse_type()?;
            ModelMember::Spread(target, self.span_from(start))
        } else {
            let decorators = self.parse_decorators()?;
            let name = self.parse_property_name()?;
            let optional = self.eat(TokenKind::Question).is_some();
            self.expect(TokenKind::Colon)?;
            let ty = self.parse_type()?;
            ModelMember::Property(PropertyDecl {
                decorators,
                name,
                optional,
                ty,
                span: self.span_from(start),
            })
        };

        if self.eat(TokenKind::Semicolon).is_none()
            && self.eat(TokenKind::Comma).is_none()
            && !self.check(close)
        {
            self.error_expected(&format!("';', ',' or {}", close.describe()));
            return Err(Recover);
        }
        Ok(member)
    }

    /// Skip past the next member separator, stopping before `close`.
    fn recover_member(&mut self, close: TokenKind) {
        let mut depth = 0usize;
        loop {
            match self.current.kind {
                TokenKind::Eof => return,
                kind if kind == close && depth == 0 => return,
                TokenKind::Semicolon | TokenKind::Comma if depth == 0 => {
                    self.advance();
                    return;
                }
                TokenKind::OpenBrace | TokenKind::OpenParen => depth += 1,
                TokenKind::CloseBrace | TokenKind::CloseParen => {
                    if depth == 0 {
                        return;
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn parse_decorators(&mut self) -> PResult<Vec<DecoratorExpr>> {
        let mut decorators = Vec::new();
        while let Some(at) = self.eat(TokenKind::At) {
            let mut path = vec![self.parse_name_allowing_keywords()?];
            while self.eat(TokenKind::Dot).is_some() {
                path.push(self.parse_name_allowing_keywords()?);
            }

            let mut args = Vec::new();
            if self.eat(TokenKind::OpenParen).is_some() {
                while !self.check(TokenKind::CloseParen) {
                    args.push(self.parse_decorator_arg()?);
                    if self.eat(TokenKind::Comma).is_none() {
                        break;
                    }
                }
                self.expect(TokenKind::CloseParen)?;
            }

            decorators.push(DecoratorExpr {
                path,
                args,
                span: self.span_from(at.span),
            });
        }
        Ok(decorators)
    }

    fn parse_decorator_arg(&mut self) -> PResult<DecoratorArgExpr> {
        let token = self.current;
        let literal = match token.kind {
            TokenKind::StringLiteral => Literal::String(unescape(token.lexeme)),
            TokenKind::NumberLiteral => match token.lexeme.parse::<f64>() {
                Ok(value) => Literal::Number(value),
                Err(_) => {
                    self.report(
                        DiagnosticCode::InvalidNumber,
                        format!("Invalid number literal '{}'.", token.lexeme),
                        token.span,
                    );
                    return Err(Recover);
                }
            },
            TokenKind::True => Literal::Boolean(true),
            TokenKind::False => Literal::Boolean(false),
            _ => return self.parse_type().map(DecoratorArgExpr::Type),
        };
        self.advance();
        Ok(DecoratorArgExpr::Literal(literal, token.span))
    }

    fn parse_template_params(&mut self) -> PResult<Vec<TemplateParamDecl>> {
        let mut params = Vec::new();
        if self.eat(TokenKind::LessThan).is_none() {
            return Ok(params);
        }
        loop {
            let name = self.parse_ident()?;
            let default = if self.eat(TokenKind::Equals).is_some() {
                Some(self.parse_type()?)
            } else {
                None
            };
            let span = self.span_from(name.span);
            params.push(TemplateParamDecl {
                name,
                default,
                span,
            });
            if self.eat(TokenKind::Comma).is_none() {
                break;
            }
        }
        self.expect(TokenKind::GreaterThan)?;
        Ok(params)
    }

    // =========================================
    // Types
    // =========================================

    fn parse_type(&mut self) -> PResult<TypeExpr> {
        let start = self.current.span;
        self.eat(TokenKind::Bar);
        let first = self.parse_primary_type()?;
        if !self.check(TokenKind::Bar) {
            return Ok(first);
        }

        let mut options = vec![first];
        while self.eat(TokenKind::Bar).is_some() {
            options.push(self.parse_primary_type()?);
        }
        Ok(TypeExpr::Union(options, self.span_from(start)))
    }

    fn parse_primary_type(&mut self) -> PResult<TypeExpr> {
        let start = self.current.span;
        let mut ty = match self.current.kind {
            TokenKind::Void => {
                self.advance();
                TypeExpr::Intrinsic(IntrinsicKeyword::Void, start)
            }
            TokenKind::Never => {
                self.advance();
                TypeExpr::Intrinsic(IntrinsicKeyword::Never, start)
            }
            TokenKind::OpenBrace => {
                self.advance();
                let members = self.parse_members(TokenKind::CloseBrace);
                self.expect(TokenKind::CloseBrace)?;
                TypeExpr::ModelExpression(members, self.span_from(start))
            }
            TokenKind::OpenParen => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect(TokenKind::CloseParen)?;
                inner
            }
            TokenKind::Identifier => TypeExpr::Reference(self.parse_type_reference()?),
            _ => {
                self.error_expected("Type");
                return Err(Recover);
            }
        };

        while self.check(TokenKind::OpenBracket) {
            self.advance();
            self.expect(TokenKind::CloseBracket)?;
            ty = TypeExpr::Array(Box::new(ty), self.span_from(start));
        }
        Ok(ty)
    }

    fn parse_type_reference(&mut self) -> PResult<TypeReference> {
        let start = self.current.span;
        let path = self.parse_path()?;
        let mut args = Vec::new();
        let has_arg_list = self.eat(TokenKind::LessThan).is_some();
        if has_arg_list {
            while !self.check(TokenKind::GreaterThan) {
                args.push(self.parse_type()?);
                if self.eat(TokenKind::Comma).is_none() {
                    break;
                }
            }
            self.expect(TokenKind::GreaterThan)?;
        }
        Ok(TypeReference {
            path,
            args,
            has_arg_list,
            span: self.span_from(start),
        })
    }

    // =========================================
    // Names
    // =========================================

    fn parse_path(&mut self) -> PResult<Vec<Ident>> {
        let mut path = vec![self.parse_ident()?];
        while self.eat(TokenKind::Dot).is_some() {
            path.push(self.parse_ident()?);
        }
        Ok(path)
    }

    fn parse_ident(&mut self) -> PResult<Ident> {
        let token = self.expect(TokenKind::Identifier)?;
        Ok(Ident::new(token.lexeme, token.span))
    }

    fn parse_name_allowing_keywords(&mut self) -> PResult<Ident> {
        if self.current.kind.is_keyword() {
            let token = self.advance();
            return Ok(Ident::new(token.lexeme, token.span));
        }
        self.parse_ident()
    }

    /// Property names may be identifiers, keywords or string literals.
    fn parse_property_name(&mut self) -> PResult<Ident> {
        if self.check(TokenKind::StringLiteral) {
            let token = self.advance();
            return Ok(Ident::new(unescape(token.lexeme), token.span));
        }
        self.parse_name_allowing_keywords()
    }
}

/// Strip quotes and resolve escapes in a string literal lexeme.
fn unescape(lexeme: &str) -> String {
    let inner = lexeme.strip_prefix('"').unwrap_or(lexeme);
    let inner = inner.strip_suffix('"').unwrap_or(inner);

    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_ok(source: &str) -> Script {
        let (script, diagnostics) = Parser::parse(source, SourceFileId::new(1));
        assert!(diagnostics.is_empty(), "unexpected diagnostics: {diagnostics:?}");
        script
    }

    fn codes(source: &str) -> Vec<DiagnosticCode> {
        let (_, diagnostics) = Parser::parse(source, SourceFileId::new(1));
        diagnostics.into_iter().map(|d| d.code).collect()
    }

    #[test]
    fn parse_model_with_properties() {
        let script = parse_ok(
            r#"
            @doc("A pet")
            model Pet {
                name: string;
                tag?: string,
                "kebab-name": int32;
                ...Base;
            }
        "#,
        );
        let Item::Model(model) = &script.items()[0] else {
            panic!("expected model");
        };
        assert_eq!(model.name.name, "Pet");
        assert_eq!(model.decorators.len(), 1);
        assert_eq!(model.members.len(), 4);
        let ModelMember::Property(tag) = &model.members[1] else {
            panic!("expected property");
        };
        assert!(tag.optional);
        let ModelMember::Property(kebab) = &model.members[2] else {
            panic!("expected property");
        };
        assert_eq!(kebab.name.name, "kebab-name");
        assert!(matches!(model.members[3], ModelMember::Spread(..)));
    }

    #[test]
    fn parse_templated_model_with_default_and_heritage() {
        let script = parse_ok("model Page<T, U = string> extends Base<T> { items: T[]; }");
        let Item::Model(model) = &script.items()[0] else {
            panic!("expected model");
        };
        assert_eq!(model.template_params.len(), 2);
        assert!(model.template_params[1].default.is_some());
        assert!(matches!(model.heritage, ModelHeritage::Extends(_)));
    }

    #[test]
    fn parse_model_is_without_body() {
        let script = parse_ok("model StringA is string;");
        let Item::Model(model) = &script.items()[0] else {
            panic!("expected model");
        };
        assert!(matches!(model.heritage, ModelHeritage::Is(_)));
        assert!(model.members.is_empty());
    }

    #[test]
    fn parse_operation_forms() {
        let script = parse_ok(
            r#"
            op foo<TString, TPayload>(name: TString, payload: TPayload): boolean;
            @test op newFoo: foo<StringA, PayloadA>;
            op nothing(): void;
        "#,
        );
        assert_eq!(script.items().len(), 3);
        let Item::Operation(reuse) = &script.items()[1] else {
            panic!("expected operation");
        };
        let OperationSignature::Reference(TypeExpr::Reference(target)) = &reuse.signature else {
            panic!("expected reuse");
        };
        assert_eq!(target.path_text(), "foo");
        assert_eq!(target.args.len(), 2);
    }

    #[test]
    fn parse_interface_members() {
        let script = parse_ok(
            r#"
            interface Store {
                get(id: string): string;
                op put(value: string): void;
                @test alias: foo<StringB, PayloadB>;
            }
        "#,
        );
        let Item::Interface(iface) = &script.items()[0] else {
            panic!("expected interface");
        };
        let names: Vec<_> = iface.operations.iter().map(|o| o.name.name.as_str()).collect();
        assert_eq!(names, ["get", "put", "alias"]);
        assert_eq!(iface.operations[2].decorators.len(), 1);
    }

    #[test]
    fn parse_namespaces_and_imports() {
        let script = parse_ok(
            r#"
            import "./other.cadl";
            using Shared.Types;
            namespace A.B {
                namespace C { model X {} }
            }
            namespace Tail;
            model InTail {}
        "#,
        );
        assert_eq!(script.imports().len(), 1);
        assert_eq!(script.imports()[0].path, "./other.cadl");
        assert_eq!(script.items().len(), 3);
        let Item::Namespace(tail) = &script.items()[2] else {
            panic!("expected namespace");
        };
        assert!(tail.blockless);
        assert_eq!(tail.items.len(), 1);
    }

    #[test]
    fn parse_union_and_decorator_args() {
        let script = parse_ok(r#"@tag("a", 1.5, true, Foo.Bar) model M { a: A | B | void; }"#);
        let Item::Model(model) = &script.items()[0] else {
            panic!("expected model");
        };
        let args = &model.decorators[0].args;
        assert!(matches!(args[0], DecoratorArgExpr::Literal(Literal::String(ref s), _) if s == "a"));
        assert!(matches!(args[1], DecoratorArgExpr::Literal(Literal::Number(n), _) if n == 1.5));
        assert!(matches!(args[3], DecoratorArgExpr::Type(_)));
        let ModelMember::Property(prop) = &model.members[0] else {
            panic!("expected property");
        };
        assert!(matches!(&prop.ty, TypeExpr::Union(options, _) if options.len() == 3));
    }

    #[test]
    fn recovers_after_broken_statement() {
        let (script, diagnostics) = Parser::parse(
            "model Broken { a: ; } model Fine { b: string; }",
            SourceFileId::new(1),
        );
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, DiagnosticCode::TokenExpected);
        assert!(script.items().iter().any(|item| matches!(
            item,
            Item::Model(m) if m.name.name == "Fine"
        )));
    }

    #[test]
    fn missing_semicolon_is_reported() {
        assert_eq!(codes("op foo(): void"), vec![DiagnosticCode::TokenExpected]);
    }

    #[test]
    fn lexer_errors_become_diagnostics() {
        assert_eq!(
            codes("model A { a: \"oops\n; }"),
            vec![DiagnosticCode::UnterminatedString, DiagnosticCode::TokenExpected]
        );
    }

    #[test]
    fn unescape_handles_escapes() {
        assert_eq!(unescape(r#""a\"b\\n\n""#), "a\"b\\n\n");
    }
}
