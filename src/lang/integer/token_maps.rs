//! Token tables for Integer BASIC.
//!
//! The interpreter often has several tokens with the same spelling, the choice depending
//! on syntactic context.  The parser resolves the context, so the table going toward
//! tokens is keyed by node kind.  The table going back is keyed by the token byte.
//! Token bytes are always below 128.

pub const OPEN_QUOTE: u8 = 0x28;
pub const CLOSE_QUOTE: u8 = 0x29;
pub const REM_TOK: u8 = 0x5d;
pub const EOL: u8 = 0x01;
/// `$` in a string variable name is a token rather than negative ASCII
pub const DOLLAR_TOK: u8 = 0x40;
/// binary numbers are prefixed by a byte in this range, 176 plus the leading digit
pub const NUM_PREFIX: std::ops::RangeInclusive<u8> = 0xb0..=0xb9;

pub const TOK_MAP: [(&str,u8);116] = [
	("sep_statement",0x03),
	("com_load",0x04),
	("com_save",0x05),
	("com_con",0x06),
	("com_run_line",0x07),
	("com_run",0x08),
	("com_del",0x09),
	("sep_del",0x0a),
	("com_new",0x0b),
	("com_clr",0x0c),
	("com_auto",0x0d),
	("sep_auto",0x0e),
	("com_man",0x0f),
	("com_himem",0x10),
	("com_lomem",0x11),
	("op_plus",0x12),
	("op_minus",0x13),
	("op_times",0x14),
	("op_div",0x15),
	("op_aeq",0x16),
	("op_aneq",0x17),
	("op_gtreq",0x18),
	("op_gtr",0x19),
	("op_lesseq",0x1a),
	("op_neq",0x1b),
	("op_less",0x1c),
	("op_and",0x1d),
	("op_or",0x1e),
	("op_mod",0x1f),
	("op_pow",0x20),
	("open_dim_str",0x22),
	("sep_slice",0x23),
	("statement_then_line",0x24),
	("statement_then",0x25),
	("sep_input_str",0x26),
	("sep_input_int",0x27),
	("open_slice",0x2a),
	("open_int",0x2d),
	("fcall_peek",0x2e),
	("fcall_rnd",0x2f),
	("fcall_sgn",0x30),
	("fcall_abs",0x31),
	("fcall_pdl",0x32),
	("open_dim_int",0x34),
	("op_unary_plus",0x35),
	("op_unary_minus",0x36),
	("op_not",0x37),
	("open_aexpr",0x38),
	("op_seq",0x39),
	("op_sneq",0x3a),
	("fcall_lenp",0x3b),
	("fcall_ascp",0x3c),
	("fcall_scrnp",0x3d),
	("sep_scrn",0x3e),
	("open_fcall",0x3f),
	("open_str",0x42),
	("sep_dim_str",0x43),
	("sep_dim_int",0x44),
	("sep_print_str",0x45),
	("sep_print_int",0x46),
	("sep_print_null",0x47),
	("sep_tab_str",0x48),
	("sep_tab_int",0x49),
	("sep_tab_null",0x4a),
	("statement_text",0x4b),
	("statement_gr",0x4c),
	("statement_call",0x4d),
	("statement_dim_str",0x4e),
	("statement_dim_int",0x4f),
	("statement_tab",0x50),
	("statement_end",0x51),
	("statement_input_str",0x52),
	("statement_input_prompt",0x53),
	("statement_input_int",0x54),
	("statement_for",0x55),
	("op_eq_for",0x56),
	("op_to",0x57),
	("op_step",0x58),
	("statement_next",0x59),
	("sep_next",0x5a),
	("statement_return",0x5b),
	("statement_gosub",0x5c),
	("statement_rem",0x5d),
	("statement_let",0x5e),
	("statement_goto",0x5f),
	("statement_if",0x60),
	("statement_print_str",0x61),
	("statement_print_int",0x62),
	("statement_print_null",0x63),
	("statement_poke",0x64),
	("sep_poke",0x65),
	("statement_coloreq",0x66),
	("statement_plot",0x67),
	("sep_plot",0x68),
	("statement_hlin",0x69),
	("sep_hlin",0x6a),
	("op_hlin_at",0x6b),
	("statement_vlin",0x6c),
	("sep_vlin",0x6d),
	("op_vlin_at",0x6e),
	("statement_vtab",0x6f),
	("op_eq_assign_str",0x70),
	("op_eq_assign_int",0x71),
	("close",0x72),
	("statement_list_line",0x74),
	("sep_list",0x75),
	("statement_list",0x76),
	("statement_pop",0x77),
	("statement_nodsp_str",0x78),
	("statement_nodsp_int",0x79),
	("statement_notrace",0x7a),
	("statement_dsp_str",0x7b),
	("statement_dsp_int",0x7c),
	("statement_trace",0x7d),
	("statement_prn",0x7e),
	("statement_inn",0x7f)
];

pub const DETOK_MAP: [(u8,&str);125] = [
	(0x03,":"),
	(0x04,"load"),
	(0x05,"save"),
	(0x06,"con"),
	(0x07,"run"),
	(0x08,"run"),
	(0x09,"del"),
	(0x0a,","),
	(0x0b,"new"),
	(0x0c,"clr"),
	(0x0d,"auto"),
	(0x0e,","),
	(0x0f,"man"),
	(0x10,"himem:"),
	(0x11,"lomem:"),
	(0x12,"+"),
	(0x13,"-"),
	(0x14,"*"),
	(0x15,"/"),
	(0x16,"="),
	(0x17,"#"),
	(0x18,">="),
	(0x19,">"),
	(0x1a,"<="),
	(0x1b,"<>"),
	(0x1c,"<"),
	(0x1d,"and"),
	(0x1e,"or"),
	(0x1f,"mod"),
	(0x20,"^"),
	(0x21,"+"),
	(0x22,"("),
	(0x23,","),
	(0x24,"then"),
	(0x25,"then"),
	(0x26,","),
	(0x27,","),
	(0x28,"\""),
	(0x29,"\""),
	(0x2a,"("),
	(0x2b,"!"),
	(0x2c,"!"),
	(0x2d,"("),
	(0x2e,"peek"),
	(0x2f,"rnd"),
	(0x30,"sgn"),
	(0x31,"abs"),
	(0x32,"pdl"),
	(0x33,"rndx"),
	(0x34,"("),
	(0x35,"+"),
	(0x36,"-"),
	(0x37,"not"),
	(0x38,"("),
	(0x39,"="),
	(0x3a,"#"),
	(0x3b,"len("),
	(0x3c,"asc("),
	(0x3d,"scrn("),
	(0x3e,","),
	(0x3f,"("),
	(0x40,"$"),
	(0x41,"$"),
	(0x42,"("),
	(0x43,","),
	(0x44,","),
	(0x45,";"),
	(0x46,";"),
	(0x47,";"),
	(0x48,","),
	(0x49,","),
	(0x4a,","),
	(0x4b,"text"),
	(0x4c,"gr"),
	(0x4d,"call"),
	(0x4e,"dim"),
	(0x4f,"dim"),
	(0x50,"tab"),
	(0x51,"end"),
	(0x52,"input"),
	(0x53,"input"),
	(0x54,"input"),
	(0x55,"for"),
	(0x56,"="),
	(0x57,"to"),
	(0x58,"step"),
	(0x59,"next"),
	(0x5a,","),
	(0x5b,"return"),
	(0x5c,"gosub"),
	(0x5d,"rem"),
	(0x5e,"let"),
	(0x5f,"goto"),
	(0x60,"if"),
	(0x61,"print"),
	(0x62,"print"),
	(0x63,"print"),
	(0x64,"poke"),
	(0x65,","),
	(0x66,"color="),
	(0x67,"plot"),
	(0x68,","),
	(0x69,"hlin"),
	(0x6a,","),
	(0x6b,"at"),
	(0x6c,"vlin"),
	(0x6d,","),
	(0x6e,"at"),
	(0x6f,"vtab"),
	(0x70,"="),
	(0x71,"="),
	(0x72,")"),
	(0x73,")"),
	(0x74,"list"),
	(0x75,","),
	(0x76,"list"),
	(0x77,"pop"),
	(0x78,"nodsp"),
	(0x79,"nodsp"),
	(0x7a,"notrace"),
	(0x7b,"dsp"),
	(0x7c,"dsp"),
	(0x7d,"trace"),
	(0x7e,"pr#"),
	(0x7f,"in#")
];
