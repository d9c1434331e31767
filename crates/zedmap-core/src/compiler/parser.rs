//! Recursive-descent parser producing a `CompiledSchema`.
//!
//! Operator precedence, lowest first: `+` (union), `&` (intersection),
//! `-` (exclusion), `->` (arrow). Chains of the same operator are flattened
//! into one set operation, so `a + b + (c + d)` has four union children. For
//! exclusion only the left operand is flattened.

use std::collections::HashSet;

use crate::compiled::{
    AllowedRelation, CompiledSchema, DocComment, MetadataBlock, MetadataPayload, ObjectDefinition,
    RelationDefinition, RelationMetadata, SetChild, SetOperation, UsersetRewrite, ELLIPSIS,
};
use crate::errors::{ZedmapError, ZedmapResult};
use crate::model::RelationKind;

use super::lexer::{Token, TokenKind};

/// Permission expression before lowering into a rewrite tree.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Ref(String),
    Arrow(String, String),
    Nil,
    Union(Vec<Expr>),
    Intersection(Vec<Expr>),
    Exclusion(Vec<Expr>),
}

pub struct Parser<'a> {
    source_name: &'a str,
    tokens: Vec<Token>,
    pos: usize,
}

impl<'a> Parser<'a> {
    /// A stream that does not end with `Eof` gets one appended after its last
    /// token.
    pub fn new(source_name: &'a str, mut tokens: Vec<Token>) -> Self {
        if tokens.last().map_or(true, |t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token {
                kind: TokenKind::Eof,
                line,
                column,
                comments: Vec::new(),
            });
        }

        Self {
            source_name,
            tokens,
            pos: 0,
        }
    }

    pub fn parse_schema(mut self) -> ZedmapResult<CompiledSchema> {
        let mut schema = CompiledSchema::default();
        let mut seen = HashSet::new();

        loop {
            let tok = self.peek().clone();
            match &tok.kind {
                TokenKind::Eof => return Ok(schema),
                TokenKind::Semicolon => {
                    self.advance();
                }
                TokenKind::Ident(kw) if kw == "definition" => {
                    self.advance();
                    let def = self.parse_definition(&tok)?;
                    if !seen.insert(def.name.clone()) {
                        return Err(self.error_at(
                            &tok,
                            format!("found duplicate definition `{}`", def.name),
                        ));
                    }
                    schema.object_definitions.push(def);
                }
                TokenKind::Ident(kw) if kw == "caveat" => {
                    return Err(self.error_at(&tok, "caveat definitions are not supported"));
                }
                other => {
                    return Err(self.error_at(
                        &tok,
                        format!("expected `definition`, found {}", other.describe()),
                    ));
                }
            }
        }
    }

    fn parse_definition(&mut self, keyword: &Token) -> ZedmapResult<ObjectDefinition> {
        let (name, _) = self.expect_ident("definition name")?;
        tracing::trace!(definition = %name, "parsing definition");

        let mut def = ObjectDefinition {
            name,
            metadata: doc_metadata(keyword, None),
            relations: Vec::new(),
        };

        self.expect(TokenKind::LBrace)?;

        let mut seen = HashSet::new();
        loop {
            let tok = self.peek().clone();
            let relation = match &tok.kind {
                TokenKind::RBrace => {
                    self.advance();
                    return Ok(def);
                }
                TokenKind::Semicolon => {
                    self.advance();
                    continue;
                }
                TokenKind::Ident(kw) if kw == "relation" => {
                    self.advance();
                    self.parse_relation(&tok)?
                }
                TokenKind::Ident(kw) if kw == "permission" => {
                    self.advance();
                    self.parse_permission(&tok)?
                }
                other => {
                    return Err(self.error_at(
                        &tok,
                        format!(
                            "expected `relation`, `permission` or `}}`, found {}",
                            other.describe()
                        ),
                    ));
                }
            };

            if !seen.insert(relation.name.clone()) {
                return Err(self.error_at(
                    &tok,
                    format!(
                        "found duplicate relation/permission name `{}` under definition `{}`",
                        relation.name, def.name
                    ),
                ));
            }
            def.relations.push(relation);
        }
    }

    fn parse_relation(&mut self, keyword: &Token) -> ZedmapResult<RelationDefinition> {
        let (name, _) = self.expect_ident("relation name")?;
        self.expect(TokenKind::Colon)?;

        let mut allowed = vec![self.parse_type_ref()?];
        while self.eat(&TokenKind::Pipe) {
            allowed.push(self.parse_type_ref()?);
        }

        Ok(RelationDefinition {
            name,
            metadata: doc_metadata(keyword, Some(RelationKind::Relation)),
            rewrite: None,
            allowed_direct_relations: allowed,
        })
    }

    fn parse_type_ref(&mut self) -> ZedmapResult<AllowedRelation> {
        let (namespace, _) = self.expect_ident("type name")?;

        let allowed = if self.eat(&TokenKind::Hash) {
            if self.eat(&TokenKind::Ellipsis) {
                AllowedRelation::ellipsis(namespace)
            } else {
                let (relation, _) = self.expect_ident("relation name")?;
                AllowedRelation::relation(namespace, relation)
            }
        } else if self.eat(&TokenKind::Colon) {
            self.expect(TokenKind::Star)?;
            AllowedRelation::wildcard(namespace)
        } else {
            AllowedRelation::relation(namespace, ELLIPSIS)
        };

        // Caveat and trait references only restrict relationships; they do not
        // change the type graph.
        if matches!(&self.peek().kind, TokenKind::Ident(kw) if kw == "with") {
            self.advance();
            self.expect_ident("caveat or trait name")?;
            while matches!(&self.peek().kind, TokenKind::Ident(kw) if kw == "and") {
                self.advance();
                self.expect_ident("caveat or trait name")?;
            }
        }

        Ok(allowed)
    }

    fn parse_permission(&mut self, keyword: &Token) -> ZedmapResult<RelationDefinition> {
        let (name, _) = self.expect_ident("permission name")?;
        self.expect(TokenKind::Equals)?;
        let expr = self.parse_union()?;

        Ok(RelationDefinition {
            name,
            metadata: doc_metadata(keyword, Some(RelationKind::Permission)),
            rewrite: Some(lower_root(expr)),
            allowed_direct_relations: Vec::new(),
        })
    }

    fn parse_union(&mut self) -> ZedmapResult<Expr> {
        let mut terms = Vec::new();
        push_flat(&mut terms, self.parse_intersection()?, is_union);
        while self.eat(&TokenKind::Plus) {
            push_flat(&mut terms, self.parse_intersection()?, is_union);
        }
        Ok(collapse(terms, Expr::Union))
    }

    fn parse_intersection(&mut self) -> ZedmapResult<Expr> {
        let mut terms = Vec::new();
        push_flat(&mut terms, self.parse_exclusion()?, is_intersection);
        while self.eat(&TokenKind::Amp) {
            push_flat(&mut terms, self.parse_exclusion()?, is_intersection);
        }
        Ok(collapse(terms, Expr::Intersection))
    }

    fn parse_exclusion(&mut self) -> ZedmapResult<Expr> {
        let mut terms = Vec::new();
        push_flat(&mut terms, self.parse_arrow()?, is_exclusion);
        while self.eat(&TokenKind::Minus) {
            terms.push(self.parse_arrow()?);
        }
        Ok(collapse(terms, Expr::Exclusion))
    }

    fn parse_arrow(&mut self) -> ZedmapResult<Expr> {
        let start = self.peek().clone();
        let primary = self.parse_primary()?;

        if !self.eat(&TokenKind::Arrow) {
            return Ok(primary);
        }

        let Expr::Ref(tupleset) = primary else {
            return Err(self.error_at(&start, "the left side of `->` must be a relation name"));
        };
        let (computed, _) = self.expect_ident("relation or permission name")?;

        if self.peek().kind == TokenKind::Arrow {
            let tok = self.peek().clone();
            return Err(self.error_at(&tok, "nested arrows are not supported"));
        }

        Ok(Expr::Arrow(tupleset, computed))
    }

    fn parse_primary(&mut self) -> ZedmapResult<Expr> {
        let tok = self.peek().clone();
        match &tok.kind {
            TokenKind::LParen => {
                self.advance();
                let inner = self.parse_union()?;
                self.expect(TokenKind::RParen)?;
                Ok(inner)
            }
            TokenKind::Ident(name) if name == "nil" => {
                self.advance();
                Ok(Expr::Nil)
            }
            TokenKind::Ident(name) => {
                self.advance();
                Ok(Expr::Ref(name.clone()))
            }
            other => Err(self.error_at(
                &tok,
                format!("expected a relation, permission or `(`, found {}", other.describe()),
            )),
        }
    }

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof and `advance` never moves past it.
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) {
        if self.peek().kind != TokenKind::Eof {
            self.pos += 1;
        }
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if &self.peek().kind == kind {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ZedmapResult<()> {
        if self.eat(&kind) {
            return Ok(());
        }
        let tok = self.peek().clone();
        Err(self.error_at(
            &tok,
            format!("expected {}, found {}", kind.describe(), tok.kind.describe()),
        ))
    }

    fn expect_ident(&mut self, what: &str) -> ZedmapResult<(String, Token)> {
        let tok = self.peek().clone();
        match &tok.kind {
            TokenKind::Ident(name) => {
                self.advance();
                Ok((name.clone(), tok))
            }
            other => Err(self.error_at(
                &tok,
                format!("expected {what}, found {}", other.describe()),
            )),
        }
    }

    fn error_at(&self, tok: &Token, message: impl Into<String>) -> ZedmapError {
        ZedmapError::compile(self.source_name, tok.line, tok.column, message)
    }
}

fn is_union(e: &Expr) -> bool {
    matches!(e, Expr::Union(_))
}

fn is_intersection(e: &Expr) -> bool {
    matches!(e, Expr::Intersection(_))
}

fn is_exclusion(e: &Expr) -> bool {
    matches!(e, Expr::Exclusion(_))
}

fn push_flat(terms: &mut Vec<Expr>, e: Expr, same_op: fn(&Expr) -> bool) {
    if same_op(&e) {
        if let Expr::Union(children) | Expr::Intersection(children) | Expr::Exclusion(children) = e
        {
            terms.extend(children);
        }
    } else {
        terms.push(e);
    }
}

fn collapse(mut terms: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Expr {
    if terms.len() == 1 {
        if let Some(only) = terms.pop() {
            return only;
        }
    }
    wrap(terms)
}

/// A permission body always lowers to a rewrite; a bare term becomes a
/// single-child union.
fn lower_root(expr: Expr) -> UsersetRewrite {
    match expr {
        Expr::Union(children) => UsersetRewrite::Union(lower_children(children)),
        Expr::Intersection(children) => UsersetRewrite::Intersection(lower_children(children)),
        Expr::Exclusion(children) => UsersetRewrite::Exclusion(lower_children(children)),
        single => UsersetRewrite::Union(SetOperation::new(vec![lower_child(single)])),
    }
}

fn lower_children(children: Vec<Expr>) -> SetOperation {
    SetOperation::new(children.into_iter().map(lower_child).collect())
}

fn lower_child(expr: Expr) -> SetChild {
    match expr {
        Expr::Ref(relation) => SetChild::ComputedUserset { relation },
        Expr::Arrow(tupleset, computed) => SetChild::TupleToUserset { tupleset, computed },
        Expr::Nil => SetChild::Nil,
        nested => SetChild::Rewrite(Box::new(lower_root(nested))),
    }
}

fn doc_metadata(keyword: &Token, kind: Option<RelationKind>) -> MetadataBlock {
    let mut block = MetadataBlock::default();
    for comment in &keyword.comments {
        block.push(&MetadataPayload::DocComment(DocComment {
            comment: comment.clone(),
        }));
    }
    if let Some(kind) = kind {
        block.push(&MetadataPayload::Relation(RelationMetadata { kind }));
    }
    block
}
