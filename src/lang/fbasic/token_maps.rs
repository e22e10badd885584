//! Intermediate-code tables for the F-BASIC decoder.
//!
//! Two static maps: single-byte codes, and the extension page selected by
//! the 0xFF prefix (mostly functions).  The decoder reads only the ranges
//! and the mappings; the tables themselves are plain data.

/// single-byte codes
pub const KEYWORDS: [(u8,&str);93] = [
    (0x80,"FOR"),
    (0x81,"PRINT"),
    (0x82,"NEXT"),
    (0x83,"DATA"),
    (0x84,"INPUT"),
    (0x85,"DIM"),
    (0x86,"READ"),
    (0x87,"LET"),
    (0x88,"GOTO"),
    (0x89,"RUN"),
    (0x8a,"IF"),
    (0x8b,"RESTORE"),
    (0x8c,"GOSUB"),
    (0x8d,"RETURN"),
    (0x8e,"REM"),
    (0x8f,"STOP"),
    (0x90,"ELSE"),
    (0x91,"TRON"),
    (0x92,"TROFF"),
    (0x93,"SWAP"),
    (0x94,"DEFSTR"),
    (0x95,"DEFINT"),
    (0x96,"DEFSNG"),
    (0x97,"DEFDBL"),
    (0x98,"ON"),
    (0x99,"WAIT"),
    (0x9a,"ERROR"),
    (0x9b,"RESUME"),
    (0x9c,"DELETE"),
    (0x9d,"AUTO"),
    (0x9e,"RENUM"),
    (0x9f,"DEF"),
    (0xa0,"POKE"),
    (0xa1,"CONT"),
    (0xa2,"LIST"),
    (0xa3,"LLIST"),
    (0xa4,"OUT"),
    (0xa5,"LPRINT"),
    (0xa6,"CLS"),
    (0xa7,"COLOR"),
    (0xa8,"PSET"),
    (0xa9,"PRESET"),
    (0xaa,"LINE"),
    (0xab,"PAINT"),
    (0xac,"CIRCLE"),
    (0xad,"GET"),
    (0xae,"PUT"),
    (0xaf,"SCREEN"),
    (0xb0,"LOCATE"),
    (0xb1,"CONSOLE"),
    (0xb2,"SYMBOL"),
    (0xb3,"NEW"),
    (0xb4,"CLEAR"),
    (0xb5,"SAVE"),
    (0xb6,"LOAD"),
    (0xb7,"MERGE"),
    (0xb8,"EXEC"),
    (0xb9,"OPEN"),
    (0xba,"CLOSE"),
    (0xbb,"FIELD"),
    (0xbc,"LSET"),
    (0xbd,"RSET"),
    (0xbe,"KILL"),
    (0xbf,"NAME"),
    (0xc0,"FILES"),
    (0xc1,"'"),
    (0xc2,"KEY"),
    (0xc3,"TERM"),
    (0xc4,"MOTOR"),
    (0xc5,"CALL"),
    (0xc6,"TAB("),
    (0xc7,"TO"),
    (0xc8,"USING"),
    (0xc9,"FN"),
    (0xca,"SPC("),
    (0xcb,"THEN"),
    (0xcc,"NOT"),
    (0xcd,"STEP"),
    (0xce,"+"),
    (0xcf,"-"),
    (0xd0,"*"),
    (0xd1,"/"),
    (0xd2,"^"),
    (0xd3,"AND"),
    (0xd4,"OR"),
    (0xd5,"XOR"),
    (0xd6,"EQV"),
    (0xd7,"IMP"),
    (0xd8,"MOD"),
    (0xd9,"\\"),
    (0xda,">"),
    (0xdb,"="),
    (0xdc,"<")
];

/// codes following the 0xFF prefix
pub const KEYWORDS_FF: [(u8,&str);42] = [
    (0x80,"SGN"),
    (0x81,"INT"),
    (0x82,"ABS"),
    (0x83,"USR"),
    (0x84,"FRE"),
    (0x85,"INP"),
    (0x86,"POS"),
    (0x87,"SQR"),
    (0x88,"RND"),
    (0x89,"LOG"),
    (0x8a,"EXP"),
    (0x8b,"COS"),
    (0x8c,"SIN"),
    (0x8d,"TAN"),
    (0x8e,"ATN"),
    (0x8f,"PEEK"),
    (0x90,"LEN"),
    (0x91,"STR$"),
    (0x92,"VAL"),
    (0x93,"ASC"),
    (0x94,"CHR$"),
    (0x95,"LEFT$"),
    (0x96,"RIGHT$"),
    (0x97,"MID$"),
    (0x98,"POINT"),
    (0x99,"CSRLIN"),
    (0x9a,"HEX$"),
    (0x9b,"OCT$"),
    (0x9c,"STRING$"),
    (0x9d,"SPACE$"),
    (0x9e,"INSTR"),
    (0x9f,"INKEY$"),
    (0xa0,"CVN"),
    (0xa1,"CVS"),
    (0xa2,"MKN$"),
    (0xa3,"MKS$"),
    (0xa4,"EOF"),
    (0xa5,"LOC"),
    (0xa6,"LOF"),
    (0xa7,"DSKF"),
    (0xa8,"TIME$"),
    (0xa9,"DATE$")
];
