//! Built-in decorators.

use super::{
    DecoratorContext, DecoratorDefinition, DecoratorLibrary, DecoratorTarget, DecoratorTargets,
    DecoratorValue,
};
use crate::types::Type;

/// State keys written by the built-in decorators.
pub mod keys {
    pub const DOC: &str = "doc";
    pub const SUMMARY: &str = "summary";
    pub const INTRINSIC: &str = "intrinsic";
    pub const KEY: &str = "key";
    pub const TAG: &str = "tag";
    pub const DEPRECATED: &str = "deprecated";
    pub const TEST: &str = "test";
}

pub(super) fn register(library: &mut DecoratorLibrary) {
    library.register(DecoratorDefinition::new("doc", DecoratorTargets::ANY, doc));
    library.register(DecoratorDefinition::new(
        "summary",
        DecoratorTargets::MODEL | DecoratorTargets::OPERATION | DecoratorTargets::INTERFACE,
        summary,
    ));
    library.register(DecoratorDefinition::new(
        "intrinsic",
        DecoratorTargets::MODEL,
        intrinsic,
    ));
    library.register(DecoratorDefinition::new("key", DecoratorTargets::PROPERTY, key));
    library.register(DecoratorDefinition::new(
        "tag",
        DecoratorTargets::OPERATION | DecoratorTargets::INTERFACE,
        tag,
    ));
    library.register(DecoratorDefinition::new(
        "deprecated",
        DecoratorTargets::ANY,
        deprecated,
    ));
    library.register(DecoratorDefinition::new(
        "test",
        DecoratorTargets::MODEL | DecoratorTargets::OPERATION | DecoratorTargets::INTERFACE,
        test,
    ));
}

/// Store the single string argument under `key`.
fn set_string(
    ctx: &mut DecoratorContext<'_>,
    key: &'static str,
    target: &DecoratorTarget,
    args: &[DecoratorValue],
) {
    if !ctx.expect_arg_count(args, 1, 1) {
        return;
    }
    if let Some(text) = ctx.string_arg(args, 0) {
        let value = DecoratorValue::string(text);
        ctx.state_mut().set(key, target.clone(), value);
    }
}

fn doc(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    set_string(ctx, keys::DOC, target, args);
}

fn summary(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    set_string(ctx, keys::SUMMARY, target, args);
}

fn intrinsic(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    set_string(ctx, keys::INTRINSIC, target, args);
}

/// `@key` or `@key("alternateName")`.
fn key(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    if !ctx.expect_arg_count(args, 0, 1) {
        return;
    }
    let DecoratorTarget::Property { name, .. } = target else {
        return;
    };
    let key_name = match args.first() {
        Some(_) => match ctx.string_arg(args, 0) {
            Some(text) => text.to_string(),
            None => return,
        },
        None => name.clone(),
    };
    ctx.state_mut()
        .set(keys::KEY, target.clone(), DecoratorValue::String(key_name));
}

fn tag(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    if !ctx.expect_arg_count(args, 1, 1) {
        return;
    }
    if let Some(text) = ctx.string_arg(args, 0) {
        let value = DecoratorValue::string(text);
        ctx.state_mut().push(keys::TAG, target.clone(), value);
    }
}

fn deprecated(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    set_string(ctx, keys::DEPRECATED, target, args);
}

/// `@test` or `@test("name")`: registers the target in the test-type map.
fn test(ctx: &mut DecoratorContext<'_>, target: &DecoratorTarget, args: &[DecoratorValue]) {
    if !ctx.expect_arg_count(args, 0, 1) {
        return;
    }
    let name = match args.first() {
        Some(_) => match ctx.string_arg(args, 0) {
            Some(text) => text.to_string(),
            None => return,
        },
        None => match ctx.target_type(target).and_then(Type::name) {
            Some(name) => name.to_string(),
            None => {
                ctx.invalid_argument("@test on an unnamed type needs an explicit name.");
                return;
            }
        },
    };
    ctx.state_mut()
        .set(keys::TEST, target.clone(), DecoratorValue::String(name));
}
