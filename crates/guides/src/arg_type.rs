//! Closed name sets referenced from guide files: argument types and the
//! hand-written edge cases. Unknown names fail at load time.

use serde::{Deserialize, Serialize};

/// Declared type of a mapped argument slot or of an NBT `convert` rule.
///
/// Every variant resolves to exactly one converter in the core's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgType {
    /// Copied through unchanged.
    Literal,
    /// Target selector or player name.
    Selector,
    /// Selector plus a legacy NBT filter token, merged into `nbt=`.
    SelectorWithNbt,
    /// Modern block state argument (`id[states]{nbt}`), written.
    Block,
    /// Modern block predicate (tags allowed), read.
    BlockPredicate,
    /// Legacy block group: id, data value or state, block entity NBT.
    LegacyBlock,
    /// Legacy block test group: id, data value (`-1` for any).
    LegacyBlockPredicate,
    /// Modern item argument (`id{nbt}` or `id[components]`), written.
    Item,
    /// Modern item predicate, read.
    ItemPredicate,
    /// Legacy item group: id, data value, item tag NBT.
    LegacyItem,
    /// Legacy item test group: id, data value, item tag NBT.
    LegacyItemPredicate,
    /// Entity type; an optional second group member holds the entity NBT
    /// whose discriminator fields pick the modern type.
    Entity,
    /// Entity NBT (summon data).
    NbtEntity,
    /// Block entity NBT.
    NbtBlock,
    /// A whole item stack compound.
    NbtItem,
    /// Untyped NBT (storage, `data merge` with unknown target).
    NbtArbitrary,
    /// NBT path.
    NbtPath,
    /// NBT path read by `data get`: group of source kind, source, path.
    NbtPathRead,
    /// JSON text component.
    TextComponent,
    /// Particle name plus its parameters.
    Particle,
    /// Sound event id.
    Sound,
    /// Status effect id (numeric or named).
    Effect,
    /// Enchantment id (numeric or named).
    Enchantment,
    /// Potion type (legacy damage value or named).
    Potion,
    /// Painting variant.
    Painting,
    /// Game mode.
    Gamemode,
    /// Difficulty.
    Difficulty,
    /// Scoreboard objective criteria.
    Criteria,
    /// Inventory slot name.
    Slot,
    /// Entity attribute id.
    Attribute,
    /// Attribute modifier operation.
    AttributeOperation,
    /// Attribute modifier identity: group of legacy UUID and name.
    AttributeModifierId,
    /// Score range: group of min and max bounds (`*` for none).
    ScoreRange,
    /// Legacy `xp` amount; an `L` suffix counts levels.
    Experience,
    /// A nested command (the tail of `execute ... run`).
    Command,
}

/// Hand-written command handlers for syntax no mapping captures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandEdgeCase {
    /// 1.12 `execute <who> <x> <y> <z> [detect ...] <command>`.
    LegacyExecute,
    /// Modern `execute` subcommand chains.
    Execute,
    /// Commands with no static equivalent; passed through with a warning.
    Unsupported,
}

/// Hand-written NBT rules that read or rewrite the parent compound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NbtEdgeCase {
    /// `Riding` chain inverted into `Passengers`.
    Riding,
    /// Five-slot `Equipment` split into `HandItems`/`ArmorItems`.
    LegacyEquipment,
    /// Drop chance arrays split or folded into `drop_chances`.
    DropChances,
    /// Hand/armor/body lists folded into the `equipment` compound.
    Equipment,
    /// `UUIDMost`/`UUIDLeast` merged into an int-array `UUID`.
    Uuid,
    /// Entity `id`, including legacy discriminator fields.
    EntityId,
    /// Block entity `id`.
    BlockEntityId,
    /// A whole item stack: id, damage, tag and components.
    ItemStack,
    /// A JSON text component stored as a string or compound.
    TextComponent,
    /// Item lore lines (plain text before 1.14).
    Lore,
    /// `Text1`..`Text4` folded into `front_text`.
    SignText,
    /// Spawner `SpawnData` shapes.
    SpawnData,
    /// Spawner `SpawnPotentials` shapes.
    SpawnPotentials,
    /// Falling block `Block`/`Data`/`TileID` to `BlockState`.
    FallingBlock,
    /// `Profession`/`Career` to `VillagerData`.
    VillagerData,
    /// Banner `Patterns` to `patterns`.
    BannerPatterns,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_snake_case() {
        let t: ArgType = serde_json::from_str("\"legacy_block_predicate\"").unwrap();
        assert_eq!(t, ArgType::LegacyBlockPredicate);
        let e: NbtEdgeCase = serde_json::from_str("\"spawn_potentials\"").unwrap();
        assert_eq!(e, NbtEdgeCase::SpawnPotentials);
        let c: CommandEdgeCase = serde_json::from_str("\"legacy_execute\"").unwrap();
        assert_eq!(c, CommandEdgeCase::LegacyExecute);
    }

    #[test]
    fn unknown_names_fail() {
        assert!(serde_json::from_str::<ArgType>("\"blocc\"").is_err());
        assert!(serde_json::from_str::<NbtEdgeCase>("\"riding_chain\"").is_err());
    }
}
