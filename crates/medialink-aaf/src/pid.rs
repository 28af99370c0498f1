//! Property ids and stored forms of the AAF object model.
//!
//! Only the properties the graph builder reads are listed.

// Stored forms.
pub const SF_DATA: u16 = 0x82;
pub const SF_DATA_STREAM: u16 = 0x42;
pub const SF_STRONG_OBJECT_REFERENCE: u16 = 0x22;
pub const SF_STRONG_OBJECT_REFERENCE_VECTOR: u16 = 0x32;
pub const SF_STRONG_OBJECT_REFERENCE_SET: u16 = 0x3A;
pub const SF_WEAK_OBJECT_REFERENCE: u16 = 0x02;

// Root storage.
pub const ROOT_META_DICTIONARY: u16 = 0x0001;
pub const ROOT_HEADER: u16 = 0x0002;

// Header / ContentStorage.
pub const HEADER_CONTENT: u16 = 0x3B03;
pub const CONTENT_MOBS: u16 = 0x1901;
pub const CONTENT_ESSENCE_DATA: u16 = 0x1902;

// EssenceData.
pub const ESSENCE_DATA_MOB_ID: u16 = 0x2701;
pub const ESSENCE_DATA_DATA: u16 = 0x2702;

// Mob.
pub const MOB_ID: u16 = 0x4401;
pub const MOB_NAME: u16 = 0x4402;
pub const MOB_SLOTS: u16 = 0x4403;

// MobSlot / TimelineMobSlot.
pub const SLOT_NAME: u16 = 0x4802;
pub const SLOT_SEGMENT: u16 = 0x4803;
pub const SLOT_EDIT_RATE: u16 = 0x4B01;
pub const SLOT_ORIGIN: u16 = 0x4B02;

// Component.
pub const COMPONENT_DATA_DEFINITION: u16 = 0x0201;
pub const COMPONENT_LENGTH: u16 = 0x0202;

// Sequence.
pub const SEQUENCE_COMPONENTS: u16 = 0x1001;

// SourceReference / SourceClip.
pub const SOURCE_ID: u16 = 0x1101;
pub const SOURCE_START_TIME: u16 = 0x1201;

// Segments that nest other segments.
pub const ESSENCE_GROUP_CHOICES: u16 = 0x0501;
pub const OPERATION_GROUP_INPUT_SEGMENTS: u16 = 0x0B02;
pub const NESTED_SCOPE_SLOTS: u16 = 0x0C01;
pub const SELECTOR_SELECTED: u16 = 0x0F01;
pub const SELECTOR_ALTERNATES: u16 = 0x0F02;

/// Properties whose targets are played in parallel by a group segment.
pub const GROUP_MEMBERS: &[u16] = &[
    OPERATION_GROUP_INPUT_SEGMENTS,
    SELECTOR_SELECTED,
    SELECTOR_ALTERNATES,
    ESSENCE_GROUP_CHOICES,
    NESTED_SCOPE_SLOTS,
];

// SourceMob / EssenceDescriptor / FileDescriptor / SoundDescriptor.
pub const SOURCE_MOB_ESSENCE_DESCRIPTION: u16 = 0x4701;
pub const DESCRIPTOR_LOCATOR: u16 = 0x2F01;
pub const FILE_DESCRIPTOR_SAMPLE_RATE: u16 = 0x3001;
pub const SOUND_QUANTIZATION_BITS: u16 = 0x3D01;
pub const SOUND_AUDIO_SAMPLING_RATE: u16 = 0x3D03;
pub const SOUND_CHANNELS: u16 = 0x3D07;

// Locators.
pub const NETWORK_LOCATOR_URL: u16 = 0x4001;
pub const TEXT_LOCATOR_NAME: u16 = 0x4101;
