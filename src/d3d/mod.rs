//! Direct3D 9 flexible vertex format (FVF) bits as stored in EPLY mesh chunks.
//!
//! Values match `d3d9types.h`. `D3DFVF_POSITION_MASK` also covers
//! `D3DFVF_XYZW`; such vertices still store three position floats.

pub const D3DFVF_RESERVED0: u32 = 0x001;
pub const D3DFVF_POSITION_MASK: u32 = 0x400E;
pub const D3DFVF_XYZ: u32 = 0x002;
pub const D3DFVF_XYZRHW: u32 = 0x004;
pub const D3DFVF_XYZB1: u32 = 0x006;
pub const D3DFVF_XYZB2: u32 = 0x008;
pub const D3DFVF_XYZB3: u32 = 0x00a;
pub const D3DFVF_XYZB4: u32 = 0x00c;
pub const D3DFVF_XYZB5: u32 = 0x00e;
pub const D3DFVF_XYZW: u32 = 0x4002;

pub const D3DFVF_NORMAL: u32 = 0x010;
pub const D3DFVF_PSIZE: u32 = 0x020;
pub const D3DFVF_DIFFUSE: u32 = 0x040;
pub const D3DFVF_SPECULAR: u32 = 0x080;

pub const D3DFVF_TEXCOUNT_MASK: u32 = 0xf00;
pub const D3DFVF_TEXCOUNT_SHIFT: u32 = 8;
pub const D3DFVF_TEX0: u32 = 0x000;
pub const D3DFVF_TEX1: u32 = 0x100;
pub const D3DFVF_TEX2: u32 = 0x200;
pub const D3DFVF_TEX3: u32 = 0x300;
pub const D3DFVF_TEX4: u32 = 0x400;
pub const D3DFVF_TEX5: u32 = 0x500;
pub const D3DFVF_TEX6: u32 = 0x600;
pub const D3DFVF_TEX7: u32 = 0x700;
pub const D3DFVF_TEX8: u32 = 0x800;

pub const D3DFVF_LASTBETA_UBYTE4: u32 = 0x1000;
pub const D3DFVF_LASTBETA_D3DCOLOR: u32 = 0x8000;

pub const D3DFVF_RESERVED2: u32 = 0x6000;

/// Number of texture coordinate sets declared by `fvf`.
pub fn tex_count(fvf: u32) -> u32 {
    (fvf & D3DFVF_TEXCOUNT_MASK) >> D3DFVF_TEXCOUNT_SHIFT
}

/// Raw `D3DFVF_XYZB*` selector, i.e. the position bits without `XYZW`.
pub fn blend_selector(fvf: u32) -> u32 {
    fvf & D3DFVF_XYZB5
}

/// Human readable `D3DFVF_*` names for the bits set in `fvf`.
pub fn fvf_names(fvf: u32) -> Vec<String> {
    let mut names = Vec::new();
    match fvf & D3DFVF_POSITION_MASK {
        0 => {}
        D3DFVF_XYZ => names.push("XYZ".to_string()),
        D3DFVF_XYZRHW => names.push("XYZRHW".to_string()),
        D3DFVF_XYZB1 => names.push("XYZB1".to_string()),
        D3DFVF_XYZB2 => names.push("XYZB2".to_string()),
        D3DFVF_XYZB3 => names.push("XYZB3".to_string()),
        D3DFVF_XYZB4 => names.push("XYZB4".to_string()),
        D3DFVF_XYZB5 => names.push("XYZB5".to_string()),
        D3DFVF_XYZW => names.push("XYZW".to_string()),
        other => names.push(format!("POSITION({:#x})", other)),
    }
    for (bit, name) in [
        (D3DFVF_NORMAL, "NORMAL"),
        (D3DFVF_PSIZE, "PSIZE"),
        (D3DFVF_DIFFUSE, "DIFFUSE"),
        (D3DFVF_SPECULAR, "SPECULAR"),
        (D3DFVF_LASTBETA_UBYTE4, "LASTBETA_UBYTE4"),
        (D3DFVF_LASTBETA_D3DCOLOR, "LASTBETA_D3DCOLOR"),
    ] {
        if fvf & bit != 0 {
            names.push(name.to_string());
        }
    }
    let tex = tex_count(fvf);
    if tex > 0 {
        names.push(format!("TEX{}", tex));
    }
    names
}
